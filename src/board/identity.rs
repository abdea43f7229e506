//! Identifier handling shared by every cache.
//!
//! The service is inconsistent in two ways: ids arrive as JSON numbers from
//! some endpoints and as strings from others (and from CLI arguments), and a
//! user-shaped record may carry its user key as `user_id`, as `id`, or both.
//! `EntityId` absorbs the first problem; [`same_user`] and [`has_user_id`]
//! are the only places the second is resolved.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A server-issued identifier, numeric or textual.
///
/// Equality and hashing use the canonical text form, so `EntityId::from(5)`
/// equals `"5".parse::<EntityId>()`.
#[derive(Clone)]
pub struct EntityId(Repr);

#[derive(Clone, Debug)]
enum Repr {
    Int(i64),
    Text(String),
}

impl EntityId {
    pub fn as_key(&self) -> Cow<'_, str> {
        match &self.0 {
            Repr::Int(n) => Cow::Owned(n.to_string()),
            Repr::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match &self.0 {
            Repr::Int(n) => Some(*n),
            Repr::Text(s) => s.parse().ok(),
        }
    }
}

impl PartialEq for EntityId {
    fn eq(&self, other: &Self) -> bool {
        self.as_key() == other.as_key()
    }
}

impl Eq for EntityId {}

impl Hash for EntityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key().hash(state);
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.as_key())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId(Repr::Int(n))
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        s.to_string().into()
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match s.parse::<i64>() {
            Ok(n) => EntityId(Repr::Int(n)),
            Err(_) => EntityId(Repr::Text(s)),
        }
    }
}

impl FromStr for EntityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Identifier must not be empty".to_string());
        }
        Ok(trimmed.into())
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Repr::Int(n) => serializer.serialize_i64(*n),
            Repr::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => EntityId(Repr::Int(n)),
            Raw::Text(s) => EntityId(Repr::Text(s)),
        })
    }
}

/// A record that identifies a user, under `user_id`, `id`, or both.
pub trait UserKeyed {
    fn user_id(&self) -> Option<&EntityId>;
    fn id(&self) -> Option<&EntityId>;

    /// The key to send back to the server: `user_id` when present, else `id`.
    fn primary_user_id(&self) -> Option<&EntityId> {
        self.user_id().or_else(|| self.id())
    }
}

fn keys<T: UserKeyed + ?Sized>(record: &T) -> impl Iterator<Item = &EntityId> {
    [record.user_id(), record.id()].into_iter().flatten()
}

/// Whether two user-shaped records refer to the same user.
///
/// Every key on one side is compared against every key on the other, so a
/// membership record keyed by `user_id` matches a directory entry keyed by
/// `id`.
pub fn same_user<A, B>(a: &A, b: &B) -> bool
where
    A: UserKeyed + ?Sized,
    B: UserKeyed + ?Sized,
{
    keys(a).any(|left| keys(b).any(|right| left == right))
}

/// Whether a user-shaped record carries `id` under either key.
pub fn has_user_id<T: UserKeyed + ?Sized>(record: &T, id: &EntityId) -> bool {
    keys(record).any(|key| key == id)
}

/// `candidates` minus every record that [`same_user`]-matches one in `excluded`.
pub fn excluding<T, U>(candidates: &[T], excluded: &[U]) -> Vec<T>
where
    T: UserKeyed + Clone,
    U: UserKeyed,
{
    candidates
        .iter()
        .filter(|candidate| !excluded.iter().any(|other| same_user(*candidate, other)))
        .cloned()
        .collect()
}

/// `candidates` restricted to records that match one in `included`.
pub fn intersecting<T, U>(candidates: &[T], included: &[U]) -> Vec<T>
where
    T: UserKeyed + Clone,
    U: UserKeyed,
{
    candidates
        .iter()
        .filter(|candidate| included.iter().any(|other| same_user(*candidate, other)))
        .cloned()
        .collect()
}
