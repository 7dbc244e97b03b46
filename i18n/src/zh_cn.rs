//! Simplified Chinese catalog.

pub(crate) const MESSAGES: &[(&str, &str)] = &[
    ("help_title", "帮助"),
    ("help_text", "我会把入群申请交给群成员投票。请将我设为拥有邀请权限的管理员，并为新成员开启入群审核。"),
    ("btn_approve", "批准"),
    ("btn_reject", "拒绝"),
    ("btn_ban", "封禁"),
    ("btn_status", "状态"),
    ("jr_requesting", "{user} (<code>{user_id}</code>) 正在申请加入本群。"),
    ("jr_poll_question", "是否允许该用户加入本群？"),
    ("jr_poll_yes", "允许"),
    ("jr_poll_no", "拒绝"),
    ("jr_live_result", "实时结果"),
    ("jr_apply_notice", "你已申请加入 {group_name}，群成员将在 {vote_minutes} 分钟内对你的申请进行投票。"),
    ("jr_final_votes", "投票结束。允许 : 拒绝 = {yes_votes} : {no_votes}"),
    ("jr_not_enough_voters", "投票人数不足，申请已被拒绝。"),
    ("jr_group_approved", "投票通过，用户已被批准入群。"),
    ("jr_group_tie", "票数相同，申请已被拒绝。"),
    ("jr_group_rejected", "投票未通过，申请已被拒绝。"),
    ("jr_status_approved", "{user} (<code>{user_id}</code>) 已通过投票入群。"),
    ("jr_status_tie", "{user} (<code>{user_id}</code>) 的申请因票数相同被拒绝。"),
    ("jr_status_rejected", "{user} (<code>{user_id}</code>) 的申请已被拒绝。"),
    ("jr_status_not_enough_voters", "{user} (<code>{user_id}</code>) 的申请因投票人数不足被拒绝。"),
    ("jr_status_admin_approved", "{user} (<code>{user_id}</code>) 已被 {admin} 批准。"),
    ("jr_status_admin_rejected", "{user} (<code>{user_id}</code>) 已被 {admin} 拒绝。"),
    ("jr_status_admin_banned", "{user} (<code>{user_id}</code>) 已被 {admin} 封禁。"),
    ("jr_private_approved", "你的申请已通过，欢迎加入！"),
    ("jr_private_rejected", "抱歉，你的申请未通过。"),
    ("jr_no_votes_private", "参与投票的成员不足，你的申请未通过。"),
    ("jr_vote_recorded", "你的投票已记录。"),
    ("jr_already_voted", "你已经投过票了。"),
    ("jr_not_voted", "投票后才能查看实时结果。"),
    ("jr_live_votes_anonymous", "允许：{yes_votes}\n拒绝：{no_votes}"),
    ("jr_live_votes_public", "允许：{yes_votes}\n{yes_names}\n\n拒绝：{no_votes}\n{no_names}"),
    ("jr_vote_open", "投票进行中，剩余时间：{remaining}。"),
    ("jr_vote_over", "该申请的投票已结束。"),
    ("insufficient_permissions", "你没有执行此操作的权限。"),
    ("expired", "已过期"),
    ("done", "完成"),
    ("invalid_input", "无效的请求"),
    ("unavailable", "出现错误，请稍后再试。"),
];
