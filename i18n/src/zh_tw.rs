//! Traditional Chinese catalog.

pub(crate) const MESSAGES: &[(&str, &str)] = &[
    ("help_title", "說明"),
    ("help_text", "我會把入群申請交給群組成員投票。請將我設為擁有邀請權限的管理員，並為新成員開啟入群審核。"),
    ("btn_approve", "批准"),
    ("btn_reject", "拒絕"),
    ("btn_ban", "封鎖"),
    ("btn_status", "狀態"),
    ("jr_requesting", "{user} (<code>{user_id}</code>) 正在申請加入本群組。"),
    ("jr_poll_question", "是否允許該使用者加入本群組？"),
    ("jr_poll_yes", "允許"),
    ("jr_poll_no", "拒絕"),
    ("jr_live_result", "即時結果"),
    ("jr_apply_notice", "你已申請加入 {group_name}，群組成員將在 {vote_minutes} 分鐘內對你的申請進行投票。"),
    ("jr_final_votes", "投票結束。允許 : 拒絕 = {yes_votes} : {no_votes}"),
    ("jr_not_enough_voters", "投票人數不足，申請已被拒絕。"),
    ("jr_group_approved", "投票通過，使用者已獲准加入。"),
    ("jr_group_tie", "票數相同，申請已被拒絕。"),
    ("jr_group_rejected", "投票未通過，申請已被拒絕。"),
    ("jr_status_approved", "{user} (<code>{user_id}</code>) 已通過投票加入。"),
    ("jr_status_tie", "{user} (<code>{user_id}</code>) 的申請因票數相同被拒絕。"),
    ("jr_status_rejected", "{user} (<code>{user_id}</code>) 的申請已被拒絕。"),
    ("jr_status_not_enough_voters", "{user} (<code>{user_id}</code>) 的申請因投票人數不足被拒絕。"),
    ("jr_status_admin_approved", "{user} (<code>{user_id}</code>) 已被 {admin} 批准。"),
    ("jr_status_admin_rejected", "{user} (<code>{user_id}</code>) 已被 {admin} 拒絕。"),
    ("jr_status_admin_banned", "{user} (<code>{user_id}</code>) 已被 {admin} 封鎖。"),
    ("jr_private_approved", "你的申請已通過，歡迎加入！"),
    ("jr_private_rejected", "抱歉，你的申請未通過。"),
    ("jr_no_votes_private", "參與投票的成員不足，你的申請未通過。"),
    ("jr_vote_recorded", "你的投票已記錄。"),
    ("jr_already_voted", "你已經投過票了。"),
    ("jr_not_voted", "投票後才能查看即時結果。"),
    ("jr_live_votes_anonymous", "允許：{yes_votes}\n拒絕：{no_votes}"),
    ("jr_live_votes_public", "允許：{yes_votes}\n{yes_names}\n\n拒絕：{no_votes}\n{no_names}"),
    ("jr_vote_open", "投票進行中，剩餘時間：{remaining}。"),
    ("jr_vote_over", "此申請的投票已結束。"),
    ("insufficient_permissions", "你沒有執行此操作的權限。"),
    ("expired", "已過期"),
    ("done", "完成"),
    ("invalid_input", "無效的請求"),
    ("unavailable", "發生錯誤，請稍後再試。"),
];
