use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::encoding::ProfileValue;
use crate::profile::error::ProfileError;
use crate::profile::model::{ProfilePayload, UserProfile};
use crate::store::Store;
use crate::util::time::now_nanos;

/// Profile operations over the persistent map
///
/// Every operation holds `op_lock` for its whole duration, so calls never
/// interleave. The two writes of follow/unfollow are still separate puts:
/// if the second step fails the first is kept.
pub struct ProfileStore {
  store: Store,
  op_lock: Mutex<()>,
}

impl ProfileStore {
  pub fn new(store: Store) -> Self {
    Self {
      store,
      op_lock: Mutex::new(()),
    }
  }

  /// All stored profiles in key order
  pub fn list(&self) -> Result<Vec<UserProfile>, ProfileError> {
    let _guard = self.lock()?;
    let values = self
      .store
      .values()
      .map_err(|e| ProfileError::Internal(format!("Failed to retrieve user profiles: {}", e)))?;

    values
      .iter()
      .map(|bytes| {
        ProfileValue::deserialize(bytes)
          .map(ProfileValue::into_profile)
          .map_err(|e| ProfileError::Internal(format!("Failed to retrieve user profiles: {}", e)))
      })
      .collect()
  }

  pub fn get(&self, id: &str) -> Result<UserProfile, ProfileError> {
    require_id(id)?;
    let _guard = self.lock()?;
    self.load(id)?.ok_or_else(|| {
      debug!("Profile {} not found", id);
      ProfileError::NotFound(format!("A user profile with id={} not found", id))
    })
  }

  pub fn create(&self, payload: ProfilePayload) -> Result<UserProfile, ProfileError> {
    require_payload(&payload)?;
    let _guard = self.lock()?;

    let profile = UserProfile::new(
      Uuid::new_v4().to_string(),
      payload.username,
      payload.bio,
      now_nanos(),
    );
    self.save(&profile)?;

    info!("Created profile {} ({})", profile.id, profile.username);
    Ok(profile)
  }

  pub fn update(&self, id: &str, payload: ProfilePayload) -> Result<UserProfile, ProfileError> {
    require_id(id)?;
    require_payload(&payload)?;
    let _guard = self.lock()?;

    let current = self.load(id)?.ok_or_else(|| {
      debug!("Profile {} not found for update", id);
      ProfileError::NotFound(format!(
        "Couldn't update user profile with id={}. Profile not found",
        id
      ))
    })?;

    let updated = current.with_details(&payload, now_nanos());
    self.save(&updated)?;

    info!("Updated profile {}", id);
    Ok(updated)
  }

  /// Remove a profile. References to it in other profiles' lists are kept.
  pub fn delete(&self, id: &str) -> Result<UserProfile, ProfileError> {
    require_id(id)?;
    let _guard = self.lock()?;

    let removed = self.store.remove(id)?.ok_or_else(|| {
      debug!("Profile {} not found for delete", id);
      ProfileError::NotFound(format!(
        "Couldn't delete user profile with id={}. Profile not found",
        id
      ))
    })?;
    let profile = ProfileValue::deserialize(&removed)?.into_profile();

    info!("Deleted profile {}", id);
    Ok(profile)
  }

  /// `user_id` starts following `profile_id`.
  ///
  /// Step 1 records `profile_id` in the requester's `following`, step 2
  /// records `user_id` in the target's `followers`. Step 2 runs even when
  /// the requester is missing, and a missing target does not undo step 1.
  /// The result is always the requester as left by step 1.
  pub fn follow(&self, user_id: &str, profile_id: &str) -> Result<UserProfile, ProfileError> {
    require_ids(user_id, profile_id)?;
    let _guard = self.lock()?;

    let requester = match self.load(user_id)? {
      Some(user) => match user.with_following(profile_id) {
        Some(next) => {
          self.save(&next)?;
          Ok(next)
        }
        None => Ok(user),
      },
      None => Err(ProfileError::NotFound(format!(
        "Unable to follow: profile with id={} not found",
        user_id
      ))),
    };

    match self.load(profile_id)? {
      Some(target) => {
        if let Some(next) = target.with_follower(user_id) {
          self.save(&next)?;
        }
      }
      None if requester.is_ok() => {
        warn!(
          "Profile {} now follows missing profile {}; followers side not recorded",
          user_id, profile_id
        );
      }
      None => debug!("Neither {} nor {} exists", user_id, profile_id),
    }

    if requester.is_ok() {
      info!("Profile {} follows {}", user_id, profile_id);
    }
    requester
  }

  /// `user_id` stops following `profile_id`. Mirrors [`ProfileStore::follow`].
  pub fn unfollow(&self, user_id: &str, profile_id: &str) -> Result<UserProfile, ProfileError> {
    require_ids(user_id, profile_id)?;
    let _guard = self.lock()?;

    let requester = match self.load(user_id)? {
      Some(user) => match user.without_following(profile_id) {
        Some(next) => {
          self.save(&next)?;
          Ok(next)
        }
        None => Ok(user),
      },
      None => Err(ProfileError::NotFound(format!(
        "Unable to unfollow: profile with id={} not found",
        user_id
      ))),
    };

    match self.load(profile_id)? {
      Some(target) => {
        if let Some(next) = target.without_follower(user_id) {
          self.save(&next)?;
        }
      }
      None if requester.is_ok() => {
        warn!(
          "Unable to remove follower {} from missing profile {}",
          user_id, profile_id
        );
      }
      None => debug!("Neither {} nor {} exists", user_id, profile_id),
    }

    if requester.is_ok() {
      info!("Profile {} unfollowed {}", user_id, profile_id);
    }
    requester
  }

  /// Flush pending writes to disk
  pub fn flush(&self) -> Result<(), ProfileError> {
    let _guard = self.lock()?;
    self.store.flush()?;
    Ok(())
  }

  fn lock(&self) -> Result<MutexGuard<'_, ()>, ProfileError> {
    self
      .op_lock
      .lock()
      .map_err(|_| ProfileError::Internal("profile store lock poisoned".to_string()))
  }

  fn load(&self, id: &str) -> Result<Option<UserProfile>, ProfileError> {
    match self.store.get(id)? {
      Some(bytes) => Ok(Some(ProfileValue::deserialize(&bytes)?.into_profile())),
      None => Ok(None),
    }
  }

  fn save(&self, profile: &UserProfile) -> Result<(), ProfileError> {
    let bytes = ProfileValue::new(profile.clone()).serialize()?;
    self.store.insert(&profile.id, &bytes)?;
    Ok(())
  }
}

fn require_id(id: &str) -> Result<(), ProfileError> {
  if id.is_empty() {
    debug!("Rejected empty profile id");
    return Err(ProfileError::NotFound("Invalid ID: id must not be empty".to_string()));
  }
  Ok(())
}

fn require_ids(user_id: &str, profile_id: &str) -> Result<(), ProfileError> {
  if user_id.is_empty() || profile_id.is_empty() {
    debug!("Rejected empty user or profile id");
    return Err(ProfileError::NotFound("Invalid user or profile ID".to_string()));
  }
  Ok(())
}

fn require_payload(payload: &ProfilePayload) -> Result<(), ProfileError> {
  if !payload.is_valid() {
    debug!("Rejected profile payload with empty username or bio");
    return Err(ProfileError::InvalidPayload(
      "Invalid payload: username and bio must not be empty".to_string(),
    ));
  }
  Ok(())
}
