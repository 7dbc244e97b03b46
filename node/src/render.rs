//! Message texts and keyboards for one join request.

use joinvote_gateway::{Chat, InlineButton, InlineKeyboard, User};
use joinvote_i18n::TextResolver;
use joinvote_tally::LiveResults;
use joinvote_types::{AdminAction, CallbackAction, DeepLink, RequestId, VoteChoice, VoteCounts};
use joinvote_utils::{escape_html, user_link};

/// `@username`, or a mention link for users without one.
pub fn applicant_display(user: &User) -> String {
    match &user.username {
        Some(username) => format!("@{username}"),
        None => user_link(user.id.as_i64(), &user.full_name()),
    }
}

/// `@username`, or the escaped full name.
pub fn admin_display(user: &User) -> String {
    match &user.username {
        Some(username) => format!("@{username}"),
        None => escape_html(&user.full_name()),
    }
}

/// Approve / Reject / Ban, then Status.
pub fn request_card_keyboard(texts: &TextResolver, language: &str, id: RequestId) -> InlineKeyboard {
    let admin = |action: AdminAction, key: &str| {
        InlineButton::callback(
            texts.text(language, key),
            CallbackAction::Admin { id, action }.encode(),
        )
    };
    InlineKeyboard::new()
        .row(vec![
            admin(AdminAction::Approve, "btn_approve"),
            admin(AdminAction::Reject, "btn_reject"),
            admin(AdminAction::Ban, "btn_ban"),
        ])
        .row(vec![InlineButton::callback(
            texts.text(language, "btn_status"),
            CallbackAction::Status { id }.encode(),
        )])
}

/// Yes / No buttons, plus a live-results link when the bot's username is known.
pub fn per_voter_keyboard(
    texts: &TextResolver,
    language: &str,
    id: RequestId,
    bot_username: Option<&str>,
) -> InlineKeyboard {
    let vote = |choice: VoteChoice, key: &str| {
        InlineButton::callback(
            texts.text(language, key),
            CallbackAction::Vote { id, choice }.encode(),
        )
    };
    let keyboard = InlineKeyboard::new().row(vec![
        vote(VoteChoice::Yes, "jr_poll_yes"),
        vote(VoteChoice::No, "jr_poll_no"),
    ]);
    match bot_username {
        Some(username) => keyboard.row(vec![InlineButton::url(
            texts.text(language, "jr_live_result"),
            live_result_url(username, id),
        )]),
        None => keyboard,
    }
}

pub fn live_result_url(bot_username: &str, id: RequestId) -> String {
    format!(
        "https://t.me/{}?start={}",
        bot_username.trim_start_matches('@'),
        DeepLink::LiveResult(id).encode()
    )
}

/// Moderation log entry for a request.
pub fn log_text(
    chat: &Chat,
    applicant: &User,
    status: &str,
    counts: Option<VoteCounts>,
    admin: Option<&User>,
) -> String {
    let mut lines = vec![
        format!("<b>Chat:</b> {}", escape_html(&chat.display_title())),
        format!(
            "<b>User:</b> {}",
            user_link(applicant.id.as_i64(), &applicant.full_name())
        ),
        format!("<b>User ID:</b> <code>{}</code>", applicant.id),
        format!("<b>Status:</b> {status}"),
    ];
    if let Some(counts) = counts {
        lines.push(format!(
            "<b>Result:</b> Allow : Deny = {} : {}",
            counts.yes, counts.no
        ));
    }
    if let Some(admin) = admin {
        lines.push(format!(
            "<b>Admin:</b> {}",
            user_link(admin.id.as_i64(), &admin.full_name())
        ));
    }
    lines.join("\n")
}

/// Live results for a voter: counts, plus names on public ballots.
pub fn live_results_text(texts: &TextResolver, language: &str, live: &LiveResults) -> String {
    let yes_votes = live.counts.yes.to_string();
    let no_votes = live.counts.no.to_string();
    match &live.roster {
        None => texts.resolve(
            language,
            "jr_live_votes_anonymous",
            &[("yes_votes", yes_votes.as_str()), ("no_votes", no_votes.as_str())],
        ),
        Some(roster) => {
            let names = |names: &[String]| {
                if names.is_empty() {
                    "-".to_string()
                } else {
                    names
                        .iter()
                        .map(|n| escape_html(n))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            };
            let yes_names = names(&roster.yes[..]);
            let no_names = names(&roster.no[..]);
            texts.resolve(
                language,
                "jr_live_votes_public",
                &[
                    ("yes_votes", yes_votes.as_str()),
                    ("no_votes", no_votes.as_str()),
                    ("yes_names", yes_names.as_str()),
                    ("no_names", no_names.as_str()),
                ],
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use joinvote_tally::Roster;
    use joinvote_types::{ChatId, UserId};

    fn user(username: Option<&str>) -> User {
        User {
            id: UserId(7),
            username: username.map(str::to_string),
            first_name: "Ada <3".into(),
            last_name: None,
        }
    }

    #[test]
    fn displays_prefer_username() {
        assert_eq!(applicant_display(&user(Some("ada"))), "@ada");
        assert_eq!(
            applicant_display(&user(None)),
            r#"<a href="tg://user?id=7">Ada &lt;3</a>"#
        );
        assert_eq!(admin_display(&user(None)), "Ada &lt;3");
    }

    #[test]
    fn card_keyboard_addresses_the_session() {
        let texts = TextResolver::new();
        let id = RequestId::new();
        let kb = request_card_keyboard(&texts, "en_US", id);
        let data = kb.callback_data();
        assert_eq!(data.len(), 4);
        for d in data {
            assert_eq!(CallbackAction::decode(d).unwrap().request_id(), id);
        }
    }

    #[test]
    fn per_voter_keyboard_links_live_results() {
        let texts = TextResolver::new();
        let id = RequestId::new();
        let kb = per_voter_keyboard(&texts, "en_US", id, Some("@joinvote_bot"));
        assert_eq!(kb.rows.len(), 2);
        let without = per_voter_keyboard(&texts, "en_US", id, None);
        assert_eq!(without.rows.len(), 1);
        assert_eq!(
            live_result_url("@joinvote_bot", id),
            format!("https://t.me/joinvote_bot?start=r1_{}", id.to_simple())
        );
    }

    #[test]
    fn log_text_lists_result_and_admin() {
        let chat = Chat {
            id: ChatId(-1),
            title: Some("Rust & Co".into()),
        };
        let applicant = user(None);
        let pending = log_text(&chat, &applicant, "Pending", None, None);
        assert!(pending.contains("<b>Chat:</b> Rust &amp; Co"));
        assert!(!pending.contains("Result"));

        let admin = User {
            id: UserId(1),
            username: None,
            first_name: "Mod".into(),
            last_name: None,
        };
        let done = log_text(&chat, &applicant, "Denied", Some(VoteCounts::new(1, 2)), Some(&admin));
        assert!(done.contains("Allow : Deny = 1 : 2"));
        assert!(done.contains(r#"<b>Admin:</b> <a href="tg://user?id=1">Mod</a>"#));
    }

    #[test]
    fn public_live_results_list_escaped_names() {
        let texts = TextResolver::new();
        let live = LiveResults {
            counts: VoteCounts::new(1, 0),
            roster: Some(Roster {
                yes: vec!["<b>".into()],
                no: vec![],
            }),
        };
        let text = live_results_text(&texts, "en_US", &live);
        assert!(text.contains("&lt;b&gt;"));
        assert!(text.contains("Deny: 0\n-"));
    }
}
