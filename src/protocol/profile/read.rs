use std::sync::Arc;

use async_trait::async_trait;

use crate::profile::ProfileStore;
use crate::protocol::command::{Command, profile_reply, run_blocking, string_args, wrong_args};
use crate::protocol::resp::Value;

/// LISTPROFILES
pub struct ListProfilesCmd;

#[async_trait]
impl Command for ListProfilesCmd {
  fn name(&self) -> &'static str {
    "LISTPROFILES"
  }

  async fn execute(&self, items: &[Value], profiles: &Arc<ProfileStore>) -> Value {
    if items.len() != 1 {
      return wrong_args(self.name());
    }

    run_blocking(profiles, |profiles| {
      let replies = profiles
        .list()?
        .iter()
        .map(profile_reply)
        .collect::<Result<Vec<_>, _>>()?;
      Ok(Value::Array(Some(replies)))
    })
    .await
  }
}

/// GETPROFILE id
pub struct GetProfileCmd;

#[async_trait]
impl Command for GetProfileCmd {
  fn name(&self) -> &'static str {
    "GETPROFILE"
  }

  async fn execute(&self, items: &[Value], profiles: &Arc<ProfileStore>) -> Value {
    let Some([id]) = string_args::<1>(items) else {
      return wrong_args(self.name());
    };

    run_blocking(profiles, move |profiles| profile_reply(&profiles.get(&id)?)).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::profile::ProfilePayload;
  use crate::protocol::command::testing::{decode, items, profiles};

  #[tokio::test]
  async fn test_list_empty_and_filled() {
    let (_dir, profiles) = profiles();

    let reply = ListProfilesCmd.execute(&items(&["LISTPROFILES"]), &profiles).await;
    assert_eq!(reply, Value::Array(Some(vec![])));

    let a = profiles.create(ProfilePayload::new("alice", "x")).unwrap();
    let reply = ListProfilesCmd.execute(&items(&["LISTPROFILES"]), &profiles).await;
    match reply {
      Value::Array(Some(entries)) => {
        assert_eq!(entries.len(), 1);
        assert_eq!(decode(&entries[0]), a);
      }
      other => panic!("Expected array, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_list_rejects_arguments() {
    let (_dir, profiles) = profiles();
    let reply = ListProfilesCmd
      .execute(&items(&["LISTPROFILES", "extra"]), &profiles)
      .await;
    assert_eq!(
      reply,
      Value::error("ERR wrong number of arguments for 'listprofiles' command")
    );
  }

  #[tokio::test]
  async fn test_get_found_and_missing() {
    let (_dir, profiles) = profiles();
    let a = profiles.create(ProfilePayload::new("alice", "x")).unwrap();

    let reply = GetProfileCmd
      .execute(&items(&["GETPROFILE", a.id.as_str()]), &profiles)
      .await;
    assert_eq!(decode(&reply), a);

    let reply = GetProfileCmd
      .execute(&items(&["GETPROFILE", "missing"]), &profiles)
      .await;
    assert_eq!(
      reply,
      Value::error("NOTFOUND A user profile with id=missing not found")
    );

    let reply = GetProfileCmd.execute(&items(&["GETPROFILE"]), &profiles).await;
    assert_eq!(
      reply,
      Value::error("ERR wrong number of arguments for 'getprofile' command")
    );
  }

  #[tokio::test]
  async fn test_get_empty_id_is_not_found() {
    let (_dir, profiles) = profiles();
    let reply = GetProfileCmd
      .execute(&items(&["GETPROFILE", ""]), &profiles)
      .await;
    assert!(matches!(reply, Value::Error(msg) if msg.starts_with("NOTFOUND ")));
  }
}
