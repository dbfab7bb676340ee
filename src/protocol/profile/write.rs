use std::sync::Arc;

use async_trait::async_trait;

use crate::profile::{ProfilePayload, ProfileStore};
use crate::protocol::command::{Command, profile_reply, run_blocking, string_args, wrong_args};
use crate::protocol::resp::Value;

/// CREATEPROFILE username bio
pub struct CreateProfileCmd;

#[async_trait]
impl Command for CreateProfileCmd {
  fn name(&self) -> &'static str {
    "CREATEPROFILE"
  }

  async fn execute(&self, items: &[Value], profiles: &Arc<ProfileStore>) -> Value {
    let Some([username, bio]) = string_args::<2>(items) else {
      return wrong_args(self.name());
    };
    let payload = ProfilePayload::new(username, bio);

    run_blocking(profiles, move |profiles| profile_reply(&profiles.create(payload)?)).await
  }
}

/// UPDATEPROFILE id username bio
pub struct UpdateProfileCmd;

#[async_trait]
impl Command for UpdateProfileCmd {
  fn name(&self) -> &'static str {
    "UPDATEPROFILE"
  }

  async fn execute(&self, items: &[Value], profiles: &Arc<ProfileStore>) -> Value {
    let Some([id, username, bio]) = string_args::<3>(items) else {
      return wrong_args(self.name());
    };
    let payload = ProfilePayload::new(username, bio);

    run_blocking(profiles, move |profiles| {
      profile_reply(&profiles.update(&id, payload)?)
    })
    .await
  }
}

/// DELETEPROFILE id
pub struct DeleteProfileCmd;

#[async_trait]
impl Command for DeleteProfileCmd {
  fn name(&self) -> &'static str {
    "DELETEPROFILE"
  }

  async fn execute(&self, items: &[Value], profiles: &Arc<ProfileStore>) -> Value {
    let Some([id]) = string_args::<1>(items) else {
      return wrong_args(self.name());
    };

    run_blocking(profiles, move |profiles| profile_reply(&profiles.delete(&id)?)).await
  }
}
