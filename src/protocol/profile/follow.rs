use std::sync::Arc;

use async_trait::async_trait;

use crate::profile::ProfileStore;
use crate::protocol::command::{Command, profile_reply, run_blocking, string_args, wrong_args};
use crate::protocol::resp::Value;

/// FOLLOWPROFILE userId profileId
pub struct FollowProfileCmd;

#[async_trait]
impl Command for FollowProfileCmd {
  fn name(&self) -> &'static str {
    "FOLLOWPROFILE"
  }

  async fn execute(&self, items: &[Value], profiles: &Arc<ProfileStore>) -> Value {
    let Some([user_id, profile_id]) = string_args::<2>(items) else {
      return wrong_args(self.name());
    };

    run_blocking(profiles, move |profiles| {
      profile_reply(&profiles.follow(&user_id, &profile_id)?)
    })
    .await
  }
}

/// UNFOLLOWPROFILE userId profileId
pub struct UnfollowProfileCmd;

#[async_trait]
impl Command for UnfollowProfileCmd {
  fn name(&self) -> &'static str {
    "UNFOLLOWPROFILE"
  }

  async fn execute(&self, items: &[Value], profiles: &Arc<ProfileStore>) -> Value {
    let Some([user_id, profile_id]) = string_args::<2>(items) else {
      return wrong_args(self.name());
    };

    run_blocking(profiles, move |profiles| {
      profile_reply(&profiles.unfollow(&user_id, &profile_id)?)
    })
    .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::profile::ProfilePayload;
  use crate::protocol::command::testing::{decode, items, profiles};

  #[tokio::test]
  async fn test_follow_then_unfollow() {
    let (_dir, profiles) = profiles();
    let a = profiles.create(ProfilePayload::new("alice", "x")).unwrap();
    let b = profiles.create(ProfilePayload::new("bob", "y")).unwrap();

    let reply = FollowProfileCmd
      .execute(&items(&["FOLLOWPROFILE", a.id.as_str(), b.id.as_str()]), &profiles)
      .await;
    assert_eq!(decode(&reply).following, vec![b.id.clone()]);
    assert_eq!(profiles.get(&b.id).unwrap().followers, vec![a.id.clone()]);

    let reply = UnfollowProfileCmd
      .execute(&items(&["UNFOLLOWPROFILE", a.id.as_str(), b.id.as_str()]), &profiles)
      .await;
    assert!(decode(&reply).following.is_empty());
    assert!(profiles.get(&b.id).unwrap().followers.is_empty());
  }

  #[tokio::test]
  async fn test_follow_unknown_requester() {
    let (_dir, profiles) = profiles();
    let b = profiles.create(ProfilePayload::new("bob", "y")).unwrap();

    let reply = FollowProfileCmd
      .execute(&items(&["FOLLOWPROFILE", "ghost", b.id.as_str()]), &profiles)
      .await;
    assert!(matches!(reply, Value::Error(msg) if msg.starts_with("NOTFOUND ")));
  }

  #[tokio::test]
  async fn test_follow_wrong_arity() {
    let (_dir, profiles) = profiles();

    let reply = FollowProfileCmd
      .execute(&items(&["FOLLOWPROFILE", "a"]), &profiles)
      .await;
    assert_eq!(
      reply,
      Value::error("ERR wrong number of arguments for 'followprofile' command")
    );

    let reply = UnfollowProfileCmd
      .execute(&items(&["UNFOLLOWPROFILE", "a", "b", "c"]), &profiles)
      .await;
    assert_eq!(
      reply,
      Value::error("ERR wrong number of arguments for 'unfollowprofile' command")
    );
  }
}
