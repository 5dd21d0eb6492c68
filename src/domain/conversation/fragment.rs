use crate::domain::render::escape_html;

/// HTML returned to the browser right after a message is accepted: the user's
/// own bubble, a loading placeholder for the reply, and the script hook that
/// opens the SSE connection for `response_id`.
pub fn message_fragment(user_message: &str, response_id: &str, model_key: &str) -> String {
    let content_id = format!("{}-content", response_id);
    let logo_src = if model_key == "capmap" {
        "/logo.svg"
    } else {
        "/logo_luira.svg"
    };

    format!(
        r#"<div class="flex justify-end mb-6">
  <div class="user-message max-w-2xl px-4 py-3 rounded-2xl rounded-tr-none bg-gray-900 text-white break-words">{message}</div>
</div>
<div id="{id}" class="flex justify-start mb-6">
  <div class="flex items-start gap-3 max-w-2xl w-full">
    <div class="ai-avatar-container flex-shrink-0"><img src="{logo}" alt="AI"></div>
    <div class="flex flex-col gap-1 flex-1 min-w-0">
      <div id="{content}-loader" class="inline-flex items-center gap-3 px-4 py-3 bg-gray-100 rounded-2xl rounded-tl-none">
        <div class="typing-bubble"><div class="typing-dot"></div><div class="typing-dot"></div><div class="typing-dot"></div></div>
        <span class="text-xs font-medium text-gray-500">Analyzing Request...</span>
      </div>
      <div id="{content}" class="hidden text-gray-900 break-words prose prose-sm max-w-none"></div>
    </div>
  </div>
</div>
<script>startAIStream('', '{id}', '{content}');</script>"#,
        message = escape_html(user_message),
        id = response_id,
        content = content_id,
        logo = logo_src,
    )
}
