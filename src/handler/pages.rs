//! Static page templates
//!
//! The handful of fixed HTML pages the server can render. `render_page`
//! wraps a body fragment in the shared document shell; handlers that echo
//! request data reuse it so every page shares one look.

use crate::logger::LogSink;

const STYLE: &str = r"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
            line-height: 1.6;
            max-width: 700px;
            margin: 0 auto;
            padding: 30px;
            background: #f5f5f5;
            color: #333;
        }
        h1 { color: #667eea; border-bottom: 2px solid #667eea; padding-bottom: 5px; }
        nav a { margin-right: 15px; color: #667eea; text-decoration: none; }
        nav a:hover { text-decoration: underline; }
        pre {
            background: #2d2d2d;
            color: #f8f8f2;
            padding: 15px;
            border-radius: 5px;
            overflow-x: auto;
        }
        form { background: white; padding: 20px; border-radius: 5px; }
        input, textarea { display: block; margin: 10px 0; width: 100%; }
        button { background: #667eea; color: white; border: none; padding: 8px 16px; }
";

/// Wrap a body fragment in the shared document shell.
pub fn render_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    <nav><a href="/">Home</a><a href="/about">About</a><a href="/contact">Contact</a></nav>
{body}
</body>
</html>"#
    )
}

pub fn home_page() -> String {
    render_page(
        "contactd",
        r"    <h1>Welcome</h1>
    <p>A small async HTTP server. Try the <a href='/contact'>contact form</a>.</p>",
    )
}

pub fn about_page() -> String {
    render_page(
        "About",
        r"    <h1>About</h1>
    <p>contactd demonstrates request routing, content-type dispatch, and
    file logging on top of Tokio and Hyper.</p>",
    )
}

/// Contact form posting to `/contact` with multipart encoding (text field
/// plus file field).
pub fn contact_page() -> String {
    render_page(
        "Contact",
        r#"    <h1>Contact</h1>
    <form action="/contact" method="post" enctype="multipart/form-data">
        <label>Message <textarea name="msg" rows="4"></textarea></label>
        <label>Attachment <input type="file" name="attachment"></label>
        <button type="submit">Send</button>
    </form>"#,
    )
}

/// Echo page for POST handlers: the submitted payload inside a `<pre>` block.
pub fn echo_page(title: &str, payload: &str) -> String {
    let body = format!("    <h1>{title}</h1>\n    <pre>{}</pre>", escape_html(payload));
    render_page(title, &body)
}

/// Admin dashboard: current log contents plus the two control forms.
pub fn admin_page(log: &LogSink) -> String {
    let logs = log
        .read_all()
        .unwrap_or_else(|e| format!("failed to read log file: {e}"));
    let body = format!(
        r#"    <h1>Admin</h1>
    <h2>Logs</h2>
    <pre>{}</pre>
    <form action="/admin/action" method="post">
        <input type="hidden" name="action" value="stop_server">
        <button type="submit">Stop server</button>
    </form>
    <form action="/admin/action" method="post">
        <input type="hidden" name="action" value="clear_logs">
        <button type="submit">Clear logs</button>
    </form>"#,
        escape_html(&logs)
    );
    render_page("Admin", &body)
}

/// Minimal HTML escaping for text dropped into a `<pre>` block.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
