//! Nullable chat platform: record outbound calls without sending them.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use votegate_platform::{ChatPlatform, PlatformError};
use votegate_types::{AccountId, ChannelId, CommunityId, MessageId, RoleId};

/// First message id handed out, so posted ids never collide with small test ids.
const FIRST_MESSAGE_ID: u64 = 10_000;

/// A message "posted" through the null platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostedMessage {
    pub id: MessageId,
    pub channel: ChannelId,
    pub text: String,
}

/// A role grant "performed" through the null platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleGrant {
    pub community: CommunityId,
    pub account: AccountId,
    pub roles: Vec<RoleId>,
    pub reason: String,
}

#[derive(Default)]
struct State {
    /// Every call attempted, in order, successful or not.
    calls: Vec<&'static str>,
    posts: Vec<PostedMessage>,
    reactions_added: Vec<(MessageId, String)>,
    reactions_cleared: Vec<(MessageId, String)>,
    grants: Vec<RoleGrant>,
    notices: Vec<(CommunityId, String)>,
    departed: HashSet<AccountId>,
    role_names: HashMap<RoleId, String>,
    lacks_manage_roles: bool,
    fail_posts: bool,
    fail_reactions: bool,
    fail_grants: bool,
}

/// A test chat platform.
///
/// Every method yields to the scheduler once before acting so concurrent
/// callers actually interleave under a multi-threaded runtime.
pub struct NullPlatform {
    bot: AccountId,
    next_message: AtomicU64,
    state: Mutex<State>,
}

impl NullPlatform {
    pub fn new(bot: AccountId) -> Self {
        Self {
            bot,
            next_message: AtomicU64::new(FIRST_MESSAGE_ID),
            state: Mutex::new(State::default()),
        }
    }

    // ── Controls ───────────────────────────────────────────────────────

    pub fn set_manage_roles(&self, allowed: bool) {
        self.state.lock().unwrap().lacks_manage_roles = !allowed;
    }

    pub fn fail_posts(&self, fail: bool) {
        self.state.lock().unwrap().fail_posts = fail;
    }

    pub fn fail_reactions(&self, fail: bool) {
        self.state.lock().unwrap().fail_reactions = fail;
    }

    pub fn fail_grants(&self, fail: bool) {
        self.state.lock().unwrap().fail_grants = fail;
    }

    /// Mark an account as no longer a member.
    pub fn member_left(&self, account: AccountId) {
        self.state.lock().unwrap().departed.insert(account);
    }

    pub fn name_role(&self, role: RoleId, name: &str) {
        self.state
            .lock()
            .unwrap()
            .role_names
            .insert(role, name.to_string());
    }

    // ── Assertions ─────────────────────────────────────────────────────

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == method)
            .count()
    }

    pub fn posts(&self) -> Vec<PostedMessage> {
        self.state.lock().unwrap().posts.clone()
    }

    pub fn reactions_added(&self) -> Vec<(MessageId, String)> {
        self.state.lock().unwrap().reactions_added.clone()
    }

    pub fn reactions_cleared(&self) -> Vec<(MessageId, String)> {
        self.state.lock().unwrap().reactions_cleared.clone()
    }

    pub fn grants(&self) -> Vec<RoleGrant> {
        self.state.lock().unwrap().grants.clone()
    }

    pub fn notices(&self) -> Vec<(CommunityId, String)> {
        self.state.lock().unwrap().notices.clone()
    }

    fn record(&self, call: &'static str) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

impl Default for NullPlatform {
    fn default() -> Self {
        Self::new(AccountId::new(1))
    }
}

#[async_trait]
impl ChatPlatform for NullPlatform {
    fn bot_account(&self) -> AccountId {
        self.bot
    }

    async fn can_manage_roles(&self, _community: CommunityId) -> Result<bool, PlatformError> {
        tokio::task::yield_now().await;
        Ok(!self.record("can_manage_roles").lacks_manage_roles)
    }

    async fn post_message(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> Result<MessageId, PlatformError> {
        tokio::task::yield_now().await;
        let mut state = self.record("post_message");
        if state.fail_posts {
            return Err(PlatformError::Delivery(format!("channel {channel} unavailable")));
        }
        let id = MessageId::new(self.next_message.fetch_add(1, Ordering::SeqCst));
        state.posts.push(PostedMessage {
            id,
            channel,
            text: text.to_string(),
        });
        Ok(id)
    }

    async fn add_reaction(
        &self,
        _channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), PlatformError> {
        tokio::task::yield_now().await;
        let mut state = self.record("add_reaction");
        if state.fail_reactions {
            return Err(PlatformError::Delivery(format!("message {message} unavailable")));
        }
        state.reactions_added.push((message, symbol.to_string()));
        Ok(())
    }

    async fn clear_reaction(
        &self,
        _channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), PlatformError> {
        tokio::task::yield_now().await;
        let mut state = self.record("clear_reaction");
        if state.fail_reactions {
            return Err(PlatformError::Delivery(format!("message {message} unavailable")));
        }
        state.reactions_cleared.push((message, symbol.to_string()));
        Ok(())
    }

    async fn grant_roles(
        &self,
        community: CommunityId,
        account: AccountId,
        roles: &[RoleId],
        reason: &str,
    ) -> Result<(), PlatformError> {
        tokio::task::yield_now().await;
        let mut state = self.record("grant_roles");
        if state.lacks_manage_roles {
            return Err(PlatformError::MissingPermission("manage roles".into()));
        }
        if state.fail_grants {
            return Err(PlatformError::Delivery(format!("member {account} unavailable")));
        }
        state.grants.push(RoleGrant {
            community,
            account,
            roles: roles.to_vec(),
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn member_mention(&self, _community: CommunityId, account: AccountId) -> Option<String> {
        let state = self.record("member_mention");
        if state.departed.contains(&account) {
            None
        } else {
            Some(account.mention())
        }
    }

    async fn role_names(&self, _community: CommunityId, roles: &[RoleId]) -> Vec<String> {
        let state = self.record("role_names");
        roles
            .iter()
            .map(|r| {
                state
                    .role_names
                    .get(r)
                    .cloned()
                    .unwrap_or_else(|| r.mention())
            })
            .collect()
    }

    async fn notify_operators(
        &self,
        community: CommunityId,
        text: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.record("notify_operators");
        state.notices.push((community, text.to_string()));
        Ok(())
    }
}
