//! Operator notices.

use votegate_platform::ChatPlatform;
use votegate_types::CommunityId;

pub const MISSING_PERMISSIONS_NOTICE: &str = "It appears that you haven't given this bot enough \
permissions to use votemember. The bot requires the \"Manage Roles\" and the \"Manage Messages\" \
permissions in order to use votemember. You can change the permissions in the \"Roles\" tab of \
the guild settings.";

/// Tell the community's operators that the bot cannot manage roles.
///
/// Best-effort: if the notice itself cannot be delivered it is only logged.
pub async fn report_missing_permission(platform: &dyn ChatPlatform, community: CommunityId) {
    tracing::warn!(%community, "bot lacks the manage roles permission");
    if let Err(e) = platform
        .notify_operators(community, MISSING_PERMISSIONS_NOTICE)
        .await
    {
        tracing::info!(%community, error = %e, "could not deliver missing-permission notice");
    }
}
