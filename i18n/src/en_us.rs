//! English catalog (the fallback language).

pub(crate) const MESSAGES: &[(&str, &str)] = &[
    ("help_title", "Help"),
    ("help_text", "I put join requests to a vote. Add me to a group as an admin with invite permission, then enable approval for new members."),
    ("btn_approve", "Approve"),
    ("btn_reject", "Reject"),
    ("btn_ban", "Ban"),
    ("btn_status", "Status"),
    ("jr_requesting", "{user} (<code>{user_id}</code>) is requesting to join this group."),
    ("jr_poll_question", "Allow this user to join the group?"),
    ("jr_poll_yes", "Yes"),
    ("jr_poll_no", "No"),
    ("jr_live_result", "Live results"),
    ("jr_apply_notice", "You have applied to join {group_name}. Members will vote on your request over the next {vote_minutes} minute(s)."),
    ("jr_final_votes", "Voting closed. Allow : Deny = {yes_votes} : {no_votes}"),
    ("jr_not_enough_voters", "Not enough members voted. The request was denied."),
    ("jr_group_approved", "The vote passed. The user has been admitted."),
    ("jr_group_tie", "The vote tied. The request was denied."),
    ("jr_group_rejected", "The vote failed. The request was denied."),
    ("jr_status_approved", "{user} (<code>{user_id}</code>) was admitted by vote."),
    ("jr_status_tie", "{user} (<code>{user_id}</code>) was denied: the vote tied."),
    ("jr_status_rejected", "{user} (<code>{user_id}</code>) was denied."),
    ("jr_status_not_enough_voters", "{user} (<code>{user_id}</code>) was denied: not enough voters."),
    ("jr_status_admin_approved", "{user} (<code>{user_id}</code>) was approved by {admin}."),
    ("jr_status_admin_rejected", "{user} (<code>{user_id}</code>) was rejected by {admin}."),
    ("jr_status_admin_banned", "{user} (<code>{user_id}</code>) was banned by {admin}."),
    ("jr_private_approved", "Your request was approved. Welcome!"),
    ("jr_private_rejected", "Sorry, your request was denied."),
    ("jr_no_votes_private", "Not enough members voted on your request, so it was denied."),
    ("jr_vote_recorded", "Your vote has been recorded."),
    ("jr_already_voted", "You have already voted."),
    ("jr_not_voted", "Vote first to see the live results."),
    ("jr_live_votes_anonymous", "Allow: {yes_votes}\nDeny: {no_votes}"),
    ("jr_live_votes_public", "Allow: {yes_votes}\n{yes_names}\n\nDeny: {no_votes}\n{no_names}"),
    ("jr_vote_open", "Voting is open. Time remaining: {remaining}."),
    ("jr_vote_over", "Voting on this request is over."),
    ("insufficient_permissions", "You do not have permission to do this."),
    ("expired", "Expired"),
    ("done", "Done"),
    ("invalid_input", "Invalid request"),
    ("unavailable", "Something went wrong, please try again later."),
];
