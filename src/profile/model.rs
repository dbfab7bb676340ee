use serde::{Deserialize, Serialize};

/// A stored user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub id: String,
  pub username: String,
  pub bio: String,
  /// Ids of profiles following this one, in follow order
  pub followers: Vec<String>,
  /// Ids of profiles this one follows, in follow order
  pub following: Vec<String>,
  /// Nanoseconds since the Unix epoch
  pub created_at: u64,
  pub updated_at: Option<u64>,
}

impl UserProfile {
  /// Build a fresh profile with empty relationship lists
  pub fn new(
    id: impl Into<String>,
    username: impl Into<String>,
    bio: impl Into<String>,
    created_at: u64,
  ) -> Self {
    Self {
      id: id.into(),
      username: username.into(),
      bio: bio.into(),
      followers: Vec::new(),
      following: Vec::new(),
      created_at,
      updated_at: None,
    }
  }

  /// Copy with new username and bio, stamped with `now`
  pub fn with_details(&self, payload: &ProfilePayload, now: u64) -> Self {
    Self {
      username: payload.username.clone(),
      bio: payload.bio.clone(),
      updated_at: Some(now),
      ..self.clone()
    }
  }

  /// Copy with `id` appended to `following`, or `None` if already there
  pub fn with_following(&self, id: &str) -> Option<Self> {
    if self.is_following(id) {
      return None;
    }
    let mut next = self.clone();
    next.following.push(id.to_string());
    Some(next)
  }

  /// Copy with `id` appended to `followers`, or `None` if already there
  pub fn with_follower(&self, id: &str) -> Option<Self> {
    if self.is_followed_by(id) {
      return None;
    }
    let mut next = self.clone();
    next.followers.push(id.to_string());
    Some(next)
  }

  /// Copy without `id` in `following`, or `None` if it was not there
  pub fn without_following(&self, id: &str) -> Option<Self> {
    let pos = self.following.iter().position(|f| f == id)?;
    let mut next = self.clone();
    next.following.remove(pos);
    Some(next)
  }

  /// Copy without `id` in `followers`, or `None` if it was not there
  pub fn without_follower(&self, id: &str) -> Option<Self> {
    let pos = self.followers.iter().position(|f| f == id)?;
    let mut next = self.clone();
    next.followers.remove(pos);
    Some(next)
  }

  pub fn is_following(&self, id: &str) -> bool {
    self.following.iter().any(|f| f == id)
  }

  pub fn is_followed_by(&self, id: &str) -> bool {
    self.followers.iter().any(|f| f == id)
  }
}

/// Username and bio supplied to create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePayload {
  pub username: String,
  pub bio: String,
}

impl ProfilePayload {
  pub fn new(username: impl Into<String>, bio: impl Into<String>) -> Self {
    Self {
      username: username.into(),
      bio: bio.into(),
    }
  }

  /// Both fields must be non-empty
  pub fn is_valid(&self) -> bool {
    !self.username.is_empty() && !self.bio.is_empty()
  }
}
