use std::sync::Arc;

use async_trait::async_trait;

use crate::profile::ProfileStore;
use crate::protocol::command::{Command, wrong_args};
use crate::protocol::resp::Value;

/// PING [message]
pub struct PingCmd;

#[async_trait]
impl Command for PingCmd {
  fn name(&self) -> &'static str {
    "PING"
  }

  async fn execute(&self, items: &[Value], _profiles: &Arc<ProfileStore>) -> Value {
    match items {
      [_] => Value::SimpleString("PONG".to_string()),
      [_, message] => match message {
        Value::BulkString(Some(data)) => Value::bulk(data.clone()),
        Value::SimpleString(s) => Value::bulk(s.as_bytes()),
        _ => wrong_args(self.name()),
      },
      _ => wrong_args(self.name()),
    }
  }
}
