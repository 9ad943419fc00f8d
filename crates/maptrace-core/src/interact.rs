//! Interaction state machine for bounds drawing and calibration.
//!
//! The prototypes buried this logic in mouse-callback globals; here it is
//! a pure state machine driven by discrete UI events, with no widget
//! toolkit in sight. A GUI front end forwards pointer events and the geo
//! prompt result; the machine decides what they mean.
//!
//! States: [`Idle`](Interaction::Idle) (nothing drawn),
//! [`DraggingBounds`](Interaction::DraggingBounds) (pointer down, rubber
//! band live), [`AwaitingGeo`](Interaction::AwaitingGeo) (rectangle fixed,
//! waiting for the four geographic scalars), and
//! [`Calibrated`](Interaction::Calibrated).
//!
//! Redrawing a rectangle while calibrated derives the new geographic
//! extent from the prior calibration instead of prompting again, and a
//! degenerate or cancelled drag restores the prior calibration.

use crate::geocode::{Calibration, GeoBox, PixelBox};

/// Discrete UI events driving the machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    /// Pointer pressed at a pixel: start (or restart) a drag.
    Press {
        /// Horizontal pixel position.
        x: u32,
        /// Vertical pixel position.
        y: u32,
    },
    /// Pointer moved while pressed: update the rubber band.
    Drag {
        /// Horizontal pixel position.
        x: u32,
        /// Vertical pixel position.
        y: u32,
    },
    /// Pointer released: the drag rectangle is final.
    Release,
    /// The user answered the geographic-extent prompt.
    GeoEntered(GeoBox),
    /// The user backed out (ESC, dialog cancel).
    Cancel,
}

/// Interaction state. Consumed and replaced on every event.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// No bounds drawn and no calibration.
    Idle,
    /// A drag is in progress.
    DraggingBounds {
        /// Corner where the pointer went down.
        anchor: (u32, u32),
        /// Current pointer position.
        cursor: (u32, u32),
        /// Calibration to restore or derive from, when redrawing.
        prior: Option<Calibration>,
    },
    /// Rectangle fixed; waiting for the geographic extent prompt.
    AwaitingGeo {
        /// The drawn rectangle.
        pixel: PixelBox,
    },
    /// A calibration is active.
    Calibrated {
        /// The active calibration.
        calibration: Calibration,
    },
}

impl Interaction {
    /// Advance the machine by one event, returning the next state.
    ///
    /// Events that make no sense in the current state (a `Drag` without a
    /// press, a stray `GeoEntered`) leave the state unchanged.
    #[must_use]
    pub fn apply(self, event: UiEvent) -> Self {
        match (self, event) {
            // Starting a drag, from scratch or over an existing calibration.
            (Self::Idle, UiEvent::Press { x, y }) => Self::DraggingBounds {
                anchor: (x, y),
                cursor: (x, y),
                prior: None,
            },
            (Self::Calibrated { calibration }, UiEvent::Press { x, y }) => Self::DraggingBounds {
                anchor: (x, y),
                cursor: (x, y),
                prior: Some(calibration),
            },

            // Rubber-band update.
            (Self::DraggingBounds { anchor, prior, .. }, UiEvent::Drag { x, y }) => {
                Self::DraggingBounds {
                    anchor,
                    cursor: (x, y),
                    prior,
                }
            }

            // Drag finished: decide what the rectangle means.
            (
                Self::DraggingBounds {
                    anchor,
                    cursor,
                    prior,
                },
                UiEvent::Release,
            ) => match PixelBox::from_corners(anchor, cursor) {
                // Redraw over a calibration: derive the geo extent.
                Ok(pixel) => prior.map_or(Self::AwaitingGeo { pixel }, |cal| Self::Calibrated {
                    calibration: Calibration::new(pixel, cal.geo_for_sub_box(pixel)),
                }),
                // Degenerate rectangle: treat as an aborted drag.
                Err(_) => prior.map_or(Self::Idle, |calibration| Self::Calibrated { calibration }),
            },

            // Geo prompt answered.
            (Self::AwaitingGeo { pixel }, UiEvent::GeoEntered(geo)) => Self::Calibrated {
                calibration: Calibration::new(pixel, geo),
            },

            // Backing out.
            (Self::DraggingBounds { prior, .. }, UiEvent::Cancel) => {
                prior.map_or(Self::Idle, |calibration| Self::Calibrated { calibration })
            }
            (Self::AwaitingGeo { .. } | Self::Idle, UiEvent::Cancel) => Self::Idle,
            (Self::Calibrated { calibration }, UiEvent::Cancel) => Self::Calibrated { calibration },

            // Everything else is a no-op.
            (state, _) => state,
        }
    }

    /// The active calibration, if the machine is in the calibrated state.
    #[must_use]
    pub const fn calibration(&self) -> Option<&Calibration> {
        match self {
            Self::Calibrated { calibration } => Some(calibration),
            _ => None,
        }
    }
}
