use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::profile::{ProfileError, ProfileStore, UserProfile};
use crate::protocol::ping::PingCmd;
use crate::protocol::profile::{
  CreateProfileCmd, DeleteProfileCmd, FollowProfileCmd, GetProfileCmd, ListProfilesCmd,
  UnfollowProfileCmd, UpdateProfileCmd,
};
use crate::protocol::resp::Value;

/// A named command callable over RESP
#[async_trait]
pub trait Command: Send + Sync {
  /// Upper-case command name
  fn name(&self) -> &'static str;

  /// Run against the full RESP array, name included
  async fn execute(&self, items: &[Value], profiles: &Arc<ProfileStore>) -> Value;
}

/// Registry of supported commands keyed by name
pub struct CommandFactory {
  commands: HashMap<&'static str, Box<dyn Command>>,
}

impl CommandFactory {
  /// Register every supported command
  pub fn init() -> Self {
    let mut factory = Self {
      commands: HashMap::new(),
    };
    factory.register(Box::new(PingCmd));
    factory.register(Box::new(ListProfilesCmd));
    factory.register(Box::new(GetProfileCmd));
    factory.register(Box::new(CreateProfileCmd));
    factory.register(Box::new(UpdateProfileCmd));
    factory.register(Box::new(DeleteProfileCmd));
    factory.register(Box::new(FollowProfileCmd));
    factory.register(Box::new(UnfollowProfileCmd));
    factory
  }

  fn register(&mut self, cmd: Box<dyn Command>) {
    self.commands.insert(cmd.name(), cmd);
  }

  /// Parse and execute a RESP command
  pub async fn execute(&self, value: Value, profiles: &Arc<ProfileStore>) -> Value {
    let items = match value {
      Value::Array(Some(items)) if !items.is_empty() => items,
      _ => return Value::error("ERR failed to parse command"),
    };

    let name = match items[0].as_text() {
      Some(name) => name.to_uppercase(),
      None => return Value::error("ERR invalid command format"),
    };

    match self.commands.get(name.as_str()) {
      Some(cmd) => cmd.execute(&items, profiles).await,
      None => {
        debug!("Unknown command {}", name);
        Value::error(format!("ERR unknown command '{}'", name))
      }
    }
  }
}

/// Text arguments following the command name, if there are exactly `N`
pub fn string_args<const N: usize>(items: &[Value]) -> Option<[String; N]> {
  if items.len() != N + 1 {
    return None;
  }
  let args: Vec<String> = items[1..].iter().map(Value::as_text).collect::<Option<_>>()?;
  args.try_into().ok()
}

pub fn wrong_args(name: &str) -> Value {
  Value::error(format!(
    "ERR wrong number of arguments for '{}' command",
    name.to_lowercase()
  ))
}

/// `-KIND message` reply for a failed operation
pub fn error_reply(e: &ProfileError) -> Value {
  Value::error(format!("{} {}", e.kind(), e))
}

/// Profile as a bulk JSON string
pub fn profile_reply(profile: &UserProfile) -> Result<Value, ProfileError> {
  serde_json::to_vec(profile)
    .map(Value::bulk)
    .map_err(|e| ProfileError::Internal(format!("failed to encode profile: {}", e)))
}

/// Run a store operation on the blocking pool and turn the result into a reply
pub async fn run_blocking<F>(profiles: &Arc<ProfileStore>, op: F) -> Value
where
  F: FnOnce(&ProfileStore) -> Result<Value, ProfileError> + Send + 'static,
{
  let profiles = Arc::clone(profiles);
  match tokio::task::spawn_blocking(move || op(&profiles)).await {
    Ok(Ok(value)) => value,
    Ok(Err(e)) => error_reply(&e),
    Err(e) => {
      error!("Profile operation task failed: {}", e);
      Value::error("ERR internal task failure")
    }
  }
}


#[cfg(test)]
mod tests {
  use super::testing::*;
  use super::*;

  #[tokio::test]
  async fn test_dispatch_is_case_insensitive() {
    let (_dir, profiles) = profiles();
    let factory = CommandFactory::init();

    let reply = factory.execute(request(&["ping"]), &profiles).await;
    assert_eq!(reply, Value::SimpleString("PONG".to_string()));
  }

  #[tokio::test]
  async fn test_execute_unknown_command() {
    let (_dir, profiles) = profiles();
    let factory = CommandFactory::init();

    let reply = factory.execute(request(&["UNKNOWN"]), &profiles).await;
    assert_eq!(reply, Value::error("ERR unknown command 'UNKNOWN'"));
  }

  #[tokio::test]
  async fn test_execute_parse_error() {
    let (_dir, profiles) = profiles();
    let factory = CommandFactory::init();

    let reply = factory
      .execute(Value::SimpleString("not a command".to_string()), &profiles)
      .await;
    assert_eq!(reply, Value::error("ERR failed to parse command"));

    let reply = factory.execute(Value::Array(Some(vec![])), &profiles).await;
    assert_eq!(reply, Value::error("ERR failed to parse command"));

    let reply = factory
      .execute(Value::Array(Some(vec![Value::Integer(1)])), &profiles)
      .await;
    assert_eq!(reply, Value::error("ERR invalid command format"));
  }

  #[tokio::test]
  async fn test_create_then_get_through_factory() {
    let (_dir, profiles) = profiles();
    let factory = CommandFactory::init();

    let created = decode(
      &factory
        .execute(request(&["CREATEPROFILE", "alice", "x"]), &profiles)
        .await,
    );
    let fetched = decode(
      &factory
        .execute(request(&["GETPROFILE", created.id.as_str()]), &profiles)
        .await,
    );
    assert_eq!(created, fetched);
  }

  #[test]
  fn test_string_args() {
    let items = items(&["FOLLOWPROFILE", "a", "b"]);
    assert_eq!(
      string_args::<2>(&items),
      Some(["a".to_string(), "b".to_string()])
    );
    assert_eq!(string_args::<1>(&items), None);

    let with_null = vec![Value::bulk("GETPROFILE"), Value::BulkString(None)];
    assert_eq!(string_args::<1>(&with_null), None);
  }

  #[test]
  fn test_error_reply_prefixes() {
    assert_eq!(
      error_reply(&ProfileError::NotFound("gone".to_string())),
      Value::error("NOTFOUND gone")
    );
    assert_eq!(
      error_reply(&ProfileError::InvalidPayload("bad".to_string())),
      Value::error("INVALIDPAYLOAD bad")
    );
    assert_eq!(
      error_reply(&ProfileError::Internal("boom".to_string())),
      Value::error("ERR boom")
    );
  }
}
