//! Contact source component and its configuration errors.

use std::fmt;

use bevy::prelude::*;

use super::Gimmick;

/// Configuration error of a contact source.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactConfigError {
    /// The source has no collider extents.
    MissingExtents { gimmick: &'static str },
    /// The collider extents are negative or not finite.
    InvalidExtents { gimmick: &'static str, half_extents: Vec2 },
    /// A gimmick parameter is out of range.
    InvalidParameter {
        gimmick: &'static str,
        parameter: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ContactConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingExtents { gimmick } => {
                write!(f, "{gimmick}: contact source has no collider extents")
            }
            Self::InvalidExtents {
                gimmick,
                half_extents,
            } => write!(f, "{gimmick}: invalid collider half extents {half_extents}"),
            Self::InvalidParameter {
                gimmick,
                parameter,
                reason,
            } => write!(f, "{gimmick}: `{parameter}` {reason}"),
        }
    }
}

impl std::error::Error for ContactConfigError {}

/// A level entity that takes part in contact dispatch.
///
/// The source position is the entity's [`Transform`] translation; its bounds
/// are `half_extents` around that position shifted by `offset`.
#[derive(Component)]
pub struct ContactSource {
    gimmick: Box<dyn Gimmick>,
    /// Half size of the contact bounds. Zero means "discover from collider".
    pub half_extents: Vec2,
    /// Offset of the bounds center from the entity position.
    pub offset: Vec2,
    /// Disabled sources never collide; active pairs exit on the next dispatch.
    pub enabled: bool,
    retired: bool,
}

impl ContactSource {
    /// Create an enabled source with the given bounds.
    pub fn new(gimmick: impl Gimmick, half_extents: Vec2) -> Self {
        Self {
            gimmick: Box::new(gimmick),
            half_extents,
            offset: Vec2::ZERO,
            enabled: true,
            retired: false,
        }
    }

    /// Create a source whose extents are discovered from its collider.
    pub fn from_collider(gimmick: impl Gimmick) -> Self {
        Self::new(gimmick, Vec2::ZERO)
    }

    /// Builder: set the bounds offset.
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Contact bounds for a source at `position`.
    pub fn bounds(&self, position: Vec2) -> Rect {
        Rect::from_center_half_size(position + self.offset, self.half_extents)
    }

    /// Name of the gimmick policy.
    pub fn name(&self) -> &'static str {
        self.gimmick.name()
    }

    /// The gimmick policy.
    pub fn gimmick(&self) -> &dyn Gimmick {
        self.gimmick.as_ref()
    }

    /// The gimmick policy, mutably.
    pub fn gimmick_mut(&mut self) -> &mut dyn Gimmick {
        self.gimmick.as_mut()
    }

    /// Whether the source takes part in dispatch.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.retired
    }

    /// Stop colliding. Active pairs exit on the next dispatch.
    pub fn deactivate(&mut self) {
        self.enabled = false;
    }

    /// Stop colliding and despawn once no character holds the source.
    pub fn retire(&mut self) {
        self.enabled = false;
        self.retired = true;
    }

    /// Whether [`retire`](Self::retire) was called.
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// Check the bounds and the gimmick parameters.
    pub fn validate(&self) -> Result<(), ContactConfigError> {
        let gimmick = self.gimmick.name();
        if !self.half_extents.is_finite() || self.half_extents.min_element() < 0.0 {
            return Err(ContactConfigError::InvalidExtents {
                gimmick,
                half_extents: self.half_extents,
            });
        }
        if self.half_extents.min_element() == 0.0 {
            return Err(ContactConfigError::MissingExtents { gimmick });
        }
        self.gimmick.validate()
    }
}

impl fmt::Debug for ContactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactSource")
            .field("gimmick", &self.gimmick.name())
            .field("half_extents", &self.half_extents)
            .field("offset", &self.offset)
            .field("enabled", &self.enabled)
            .field("retired", &self.retired)
            .finish()
    }
}
