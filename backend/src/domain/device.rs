//! Device identity primitives.
//!
//! A tracker is known to users by a stable serial number. Every time the
//! tracker is provisioned onto a new radio module it gains another internal
//! identity; journeys, location points, and power readings are always stored
//! under one of those identities, never under the serial number.

use serde::{Deserialize, Serialize};

/// Validation errors for device identity primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceValidationError {
    /// The serial number was blank.
    #[error("serial number must not be empty")]
    EmptySerialNumber,
    /// The identity was blank.
    #[error("identity id must not be empty")]
    EmptyIdentityId,
    /// The resolver returned no identities for a serial number.
    #[error("device {serial_number} has no identities")]
    NoIdentities { serial_number: String },
}

/// User-facing device label.
///
/// # Examples
/// ```
/// use backend::domain::SerialNumber;
///
/// let serial = SerialNumber::new(" SN-100 ").expect("valid serial");
/// assert_eq!(serial.as_ref(), "SN-100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Validate and trim a serial number.
    pub fn new(value: impl Into<String>) -> Result<Self, DeviceValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DeviceValidationError::EmptySerialNumber);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for SerialNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SerialNumber {
    type Error = DeviceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SerialNumber> for String {
    fn from(value: SerialNumber) -> Self {
        value.0
    }
}

/// Internal, provisioning-scoped device identity (for example `dev:8644…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityId(String);

impl IdentityId {
    /// Validate and trim an identity.
    pub fn new(value: impl Into<String>) -> Result<Self, DeviceValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DeviceValidationError::EmptyIdentityId);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for IdentityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IdentityId {
    type Error = DeviceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IdentityId> for String {
    fn from(value: IdentityId) -> Self {
        value.0
    }
}

/// Every identity a serial number has owned, as reported by the resolver.
///
/// ## Invariants
/// - `all` is non-empty and free of duplicates.
/// - `primary` is the first element of `all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentities {
    serial_number: SerialNumber,
    all: Vec<IdentityId>,
}

impl DeviceIdentities {
    /// Build the identity set, placing `primary` first and dropping duplicates.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{DeviceIdentities, IdentityId, SerialNumber};
    ///
    /// let id1 = IdentityId::new("id-1").expect("valid id");
    /// let id2 = IdentityId::new("id-2").expect("valid id");
    /// let identities = DeviceIdentities::new(
    ///     SerialNumber::new("SN-100").expect("valid serial"),
    ///     id2.clone(),
    ///     vec![id1.clone(), id2.clone()],
    /// );
    /// assert_eq!(identities.primary(), &id2);
    /// assert_eq!(identities.all(), &[id2, id1]);
    /// ```
    pub fn new(serial_number: SerialNumber, primary: IdentityId, others: Vec<IdentityId>) -> Self {
        let mut all = Vec::with_capacity(others.len() + 1);
        all.push(primary);
        for identity in others {
            if !all.contains(&identity) {
                all.push(identity);
            }
        }
        Self { serial_number, all }
    }

    /// Build the identity set from resolver output whose first entry is primary.
    pub fn from_ordered(
        serial_number: SerialNumber,
        identities: Vec<IdentityId>,
    ) -> Result<Self, DeviceValidationError> {
        let mut iter = identities.into_iter();
        let primary = iter
            .next()
            .ok_or_else(|| DeviceValidationError::NoIdentities {
                serial_number: serial_number.to_string(),
            })?;
        Ok(Self::new(serial_number, primary, iter.collect()))
    }

    /// The serial number these identities belong to.
    pub fn serial_number(&self) -> &SerialNumber {
        &self.serial_number
    }

    /// The identity currently provisioned for the device.
    pub fn primary(&self) -> &IdentityId {
        // `all` is never empty; `new` always pushes the primary first.
        &self.all[0]
    }

    /// All identities, primary first.
    pub fn all(&self) -> &[IdentityId] {
        &self.all
    }
}

/// The authenticated principal forwarded by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    email: String,
    is_admin: bool,
}

impl Caller {
    /// Build a caller from verified claims.
    pub fn new(email: impl Into<String>, is_admin: bool) -> Self {
        Self {
            email: email.into(),
            is_admin,
        }
    }

    /// Verified email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Whether the caller belongs to the global admin group.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}
