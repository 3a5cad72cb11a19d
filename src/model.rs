//! Record kinds and the typed markers used by the router and the client.

use derive_more::Display;
use serde_json::{Map, Value};

/// A stored record: a flat JSON object whose `id` field is the primary key.
pub type Record = Map<String, Value>;

/// The six collections held by the store.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    #[display("Profile")]
    Profile,
    #[display("Workout")]
    Workout,
    #[display("Buddy connection")]
    Buddy,
    #[display("Goal")]
    Goal,
    #[display("Achievement")]
    Achievement,
    #[display("Challenge")]
    Challenge,
}

impl Kind {
    pub const COUNT: usize = 6;

    pub const ALL: [Kind; Kind::COUNT] = [
        Kind::Profile,
        Kind::Workout,
        Kind::Buddy,
        Kind::Goal,
        Kind::Achievement,
        Kind::Challenge,
    ];

    /// Path segment under `/api`
    pub fn path(self) -> &'static str {
        match self {
            Kind::Profile => "profiles",
            Kind::Workout => "workouts",
            Kind::Buddy => "buddies",
            Kind::Goal => "goals",
            Kind::Achievement => "achievements",
            Kind::Challenge => "challenges",
        }
    }

    /// Key holding the removed record in a delete response
    pub fn singular(self) -> &'static str {
        match self {
            Kind::Profile => "profile",
            Kind::Workout => "workout",
            Kind::Buddy => "buddy",
            Kind::Goal => "goal",
            Kind::Achievement => "achievement",
            Kind::Challenge => "challenge",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Compile-time handle on a record kind.
pub trait Resource: Send + Sync + 'static {
    const KIND: Kind;
}

/// Kinds exposing an unscoped "list all" operation.
pub trait Listable: Resource {}

/// Kinds exposing a "list for user" operation keyed on `user_id`.
pub trait UserScoped: Resource {}

macro_rules! resource {
    ($name:ident => $kind:expr) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Resource for $name {
            const KIND: Kind = $kind;
        }
    };
}

resource!(Profiles => Kind::Profile);
resource!(Workouts => Kind::Workout);
resource!(Buddies => Kind::Buddy);
resource!(Goals => Kind::Goal);
resource!(Achievements => Kind::Achievement);
resource!(Challenges => Kind::Challenge);

impl Listable for Profiles {}
impl Listable for Challenges {}

impl UserScoped for Workouts {}
impl UserScoped for Buddies {}
impl UserScoped for Goals {}
impl UserScoped for Achievements {}
impl UserScoped for Challenges {}
