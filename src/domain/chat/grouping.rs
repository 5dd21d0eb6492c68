use super::Chat;
use chrono::NaiveDate;
use serde::Serialize;

/// Chats bucketed by how many days ago they were created
#[derive(Debug, Default, Serialize)]
pub struct ChatGroups {
    pub today: Vec<Chat>,
    pub yesterday: Vec<Chat>,
    pub last_week: Vec<Chat>,
    pub last_month: Vec<Chat>,
    pub older: Vec<Chat>,
}

impl ChatGroups {
    pub fn len(&self) -> usize {
        self.today.len()
            + self.yesterday.len()
            + self.last_week.len()
            + self.last_month.len()
            + self.older.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group chats relative to `today` (UTC calendar days). Input order is kept within a bucket.
pub fn group_by_recency(chats: Vec<Chat>, today: NaiveDate) -> ChatGroups {
    let mut groups = ChatGroups::default();

    for chat in chats {
        let days_ago = (today - chat.created_at.date_naive()).num_days();
        match days_ago {
            i64::MIN..=0 => groups.today.push(chat),
            1 => groups.yesterday.push(chat),
            2..=7 => groups.last_week.push(chat),
            8..=30 => groups.last_month.push(chat),
            _ => groups.older.push(chat),
        }
    }

    groups
}
