//! Identifier types.

mod id_macro;

use id_macro::impl_id;
use serde::{Deserialize, Serialize};

/// Identity of one accepted peer connection.
///
/// Used only for echo exclusion and registry keys; never reused after the
/// connection is closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl_id!(ConnectionId);
