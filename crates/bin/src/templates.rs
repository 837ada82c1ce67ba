//! HTML templates for web interface
//!
//! Simple inline HTML templates without a template engine.

use yspotify::{
    SessionUser,
    membership::{GroupSummary, MemberView},
};

/// Common CSS styles for all pages
const COMMON_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 1000px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f5f5f5;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    h1 {
        color: #333;
        border-bottom: 2px solid #1db954;
        padding-bottom: 10px;
    }
    h2 {
        color: #555;
        margin-top: 30px;
    }
    .info-row {
        margin: 10px 0;
        padding: 8px;
        background: #f9f9f9;
        border-radius: 4px;
    }
    .label {
        font-weight: bold;
        color: #666;
        display: inline-block;
        width: 150px;
    }
    .value {
        color: #1db954;
    }
    .form-group {
        margin: 15px 0;
    }
    label {
        display: block;
        font-weight: bold;
        margin-bottom: 5px;
        color: #333;
    }
    input[type="text"],
    input[type="password"] {
        width: 100%;
        padding: 10px;
        border: 1px solid #ddd;
        border-radius: 4px;
        font-size: 14px;
        box-sizing: border-box;
    }
    button {
        background: #1db954;
        color: white;
        padding: 8px 16px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-size: 14px;
        font-weight: bold;
    }
    button:hover {
        background: #17a34a;
    }
    .secondary-btn {
        background: #999;
    }
    .logout-btn {
        background: #999;
        float: right;
    }
    table {
        width: 100%;
        border-collapse: collapse;
        margin: 20px 0;
    }
    th, td {
        text-align: left;
        padding: 12px;
        border-bottom: 1px solid #ddd;
    }
    th {
        background: #f0f0f0;
        font-weight: bold;
        color: #333;
    }
    .current {
        background: #eafaf0;
    }
    .error {
        color: #d9534f;
        background: #f2dede;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .notice {
        color: #8a6d3b;
        background: #fcf8e3;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .muted {
        color: #666;
        font-style: italic;
    }
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>YSpotify - {}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>"#,
        html_escape(title)
    )
}

fn error_block(error: Option<&str>) -> String {
    error.map_or(String::new(), |e| {
        format!(r#"<div class="error">{}</div>"#, html_escape(e))
    })
}

/// Render the sign-in page
pub fn signin_page(error: Option<&str>) -> String {
    let error_html = error_block(error);
    page(
        "Sign in",
        &format!(
            r#"        <h1>YSpotify</h1>
        <h2>Sign in</h2>
        {error_html}
        <form method="POST" action="/signin">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <button type="submit">Sign in</button>
        </form>
        <p style="margin-top: 20px; text-align: center;">
            No account yet? <a href="/signup">Sign up</a>
        </p>"#
        ),
    )
}

/// Render the signup page
pub fn signup_page(error: Option<&str>) -> String {
    let error_html = error_block(error);
    page(
        "Sign up",
        &format!(
            r#"        <h1>YSpotify</h1>
        <h2>Create an account</h2>
        {error_html}
        <form method="POST" action="/signup">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <div class="form-group">
                <label for="password_confirm">Confirm password:</label>
                <input type="password" id="password_confirm" name="password_confirm" required>
            </div>
            <button type="submit">Create account</button>
        </form>
        <p style="margin-top: 20px; text-align: center;">
            Already registered? <a href="/signin">Sign in</a>
        </p>"#
        ),
    )
}

/// Render the dashboard
///
/// `can_link` hides the Spotify link button when no OAuth client is configured.
pub fn main_page(
    user: &SessionUser,
    groups: &[GroupSummary],
    can_link: bool,
    notice: Option<&str>,
) -> String {
    let notice_html = notice.map_or(String::new(), |n| {
        format!(r#"<div class="notice">{}</div>"#, html_escape(n))
    });

    let spotify_html = if user.spotify_linked {
        let device = user
            .active_device
            .as_ref()
            .map_or("none".to_string(), |d| html_escape(&d.name));
        let track = user.current_track.as_ref().map_or(
            r#"<span class="muted">nothing playing</span>"#.to_string(),
            |t| {
                format!(
                    "{} by {} ({})",
                    html_escape(&t.title),
                    html_escape(&t.artist),
                    html_escape(&t.album)
                )
            },
        );
        format!(
            r#"<div class="info-row"><span class="label">Spotify name:</span> <span class="value">{}</span></div>
        <div class="info-row"><span class="label">Device:</span> <span class="value">{device}</span></div>
        <div class="info-row"><span class="label">Listening to:</span> <span class="value">{track}</span></div>
        <form method="POST" action="/unlinkspotify">
            <button type="submit" class="secondary-btn">Unlink Spotify</button>
        </form>"#,
            html_escape(user.spotify_username.as_deref().unwrap_or("unknown"))
        )
    } else if can_link {
        r#"<p class="muted">No Spotify account linked.</p>
        <a href="/loginspotify"><button type="button">Link Spotify</button></a>"#
            .to_string()
    } else {
        r#"<p class="muted">Spotify linking is not configured on this server.</p>"#.to_string()
    };

    let rows: String = groups
        .iter()
        .map(|group| {
            let role = match (group.is_member, group.is_current_leader) {
                (true, true) => "Leader",
                (true, false) => "Member",
                _ => "",
            };
            let action = if group.is_member {
                format!(
                    r#"<a href="/groups/{}/members">Members</a>"#,
                    html_escape(&percent_encode(&group.name))
                )
            } else {
                format!(
                    r#"<form method="POST" action="/groups/join" style="margin: 0;">
                        <input type="hidden" name="group" value="{}">
                        <button type="submit">Join</button>
                    </form>"#,
                    html_escape(&group.name)
                )
            };
            format!(
                r#"<tr{}>
                <td>{}</td>
                <td>{}</td>
                <td>{role}</td>
                <td>{action}</td>
            </tr>"#,
                if group.is_member {
                    r#" class="current""#
                } else {
                    ""
                },
                html_escape(&group.name),
                group.member_count
            )
        })
        .collect();

    page(
        "Dashboard",
        &format!(
            r#"        <h1>YSpotify
            <form method="POST" action="/logout" style="display: inline;">
                <button type="submit" class="logout-btn">Log out</button>
            </form>
        </h1>
        {notice_html}
        <div class="info-row"><span class="label">Username:</span> <span class="value">{}</span></div>

        <h2>Spotify</h2>
        {spotify_html}

        <h2>Groups</h2>
        <table>
            <tr>
                <th>Group</th>
                <th>Members</th>
                <th>Your role</th>
                <th></th>
            </tr>
            {rows}
        </table>"#,
            html_escape(&user.username)
        ),
    )
}

/// Render the member list of a group
pub fn members_page(group: &str, members: &[MemberView]) -> String {
    let body = if members.is_empty() {
        r#"<p class="muted">Nobody is in this group.</p>"#.to_string()
    } else {
        let rows: String = members
            .iter()
            .map(|member| {
                let track = member.current_track.as_ref().map_or(String::new(), |t| {
                    format!("{} by {}", html_escape(&t.title), html_escape(&t.artist))
                });
                format!(
                    r#"<tr>
                <td>{}{}</td>
                <td>{}</td>
                <td>{}</td>
                <td>{track}</td>
            </tr>"#,
                    html_escape(&member.username),
                    if member.is_leader { " (leader)" } else { "" },
                    html_escape(member.spotify_username.as_deref().unwrap_or("")),
                    html_escape(member.active_device.as_deref().unwrap_or("")),
                )
            })
            .collect();
        format!(
            r#"<table>
            <tr>
                <th>User</th>
                <th>Spotify name</th>
                <th>Device</th>
                <th>Listening to</th>
            </tr>
            {rows}
        </table>"#
        )
    };

    page(
        group,
        &format!(
            r#"        <h1>{}</h1>
        {body}
        <p><a href="/main">Back to dashboard</a></p>"#,
            html_escape(group)
        ),
    )
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Percent-encode a path segment
fn percent_encode(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}
