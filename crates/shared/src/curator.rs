use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;
use crate::layers::MapLayer;
use crate::models::{ChallengeError, ChallengeRound, DailyChallenge};
use crate::scoring::ROUNDS;

/// Zoom levels a challenge round may be shown at.
pub const ZOOM_RANGE: RangeInclusive<u8> = 14..=18;

/// Zoom a freshly captured location starts with.
pub const DEFAULT_ZOOM: u8 = 16;

/// A location being authored. Only lives inside a [`CuratorSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratorRound {
    pub id: u32,
    pub latlng: LatLng,
    pub zoom: u8,
    pub draggable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CuratorPhase {
    /// Map clicks add locations.
    Locations,
    /// Round `id` is draggable and its zoom is being picked.
    Zoom { id: usize },
    /// All zooms set; the submission form is open.
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CuratorError {
    TooManyLocations,
    MissingLocations { remaining: usize },
    ZoomSelectionInProgress { round: usize },
    NotDraggable { id: usize },
    ZoomOutOfRange(u8),
    NotInZoomSelection,
    NotReadyToSubmit,
    Invalid(ChallengeError),
}

impl std::fmt::Display for CuratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CuratorError::TooManyLocations => write!(f, "Already {} locations selected", ROUNDS),
            CuratorError::MissingLocations { remaining } => {
                write!(f, "Select {} more location(s) before continuing", remaining)
            }
            CuratorError::ZoomSelectionInProgress { round } => {
                write!(f, "Zoom selection for round {} is in progress", round + 1)
            }
            CuratorError::NotDraggable { id } => write!(f, "Marker {} is locked", id + 1),
            CuratorError::ZoomOutOfRange(z) => write!(
                f,
                "Zoom {} is outside {}-{}",
                z,
                ZOOM_RANGE.start(),
                ZOOM_RANGE.end()
            ),
            CuratorError::NotInZoomSelection => write!(f, "Not selecting zoom levels"),
            CuratorError::NotReadyToSubmit => write!(f, "Set a zoom for every round first"),
            CuratorError::Invalid(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CuratorError {}

impl From<ChallengeError> for CuratorError {
    fn from(e: ChallengeError) -> Self {
        CuratorError::Invalid(e)
    }
}

/// The daily challenge capture wizard.
#[derive(Debug, Clone, PartialEq)]
pub struct CuratorSession {
    rounds: Vec<CuratorRound>,
    phase: CuratorPhase,
}

impl Default for CuratorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CuratorSession {
    pub fn new() -> Self {
        CuratorSession {
            rounds: Vec::with_capacity(ROUNDS),
            phase: CuratorPhase::Locations,
        }
    }

    pub fn rounds(&self) -> &[CuratorRound] {
        &self.rounds
    }

    pub fn phase(&self) -> CuratorPhase {
        self.phase
    }

    /// Locations still needed before zoom selection can start.
    pub fn remaining(&self) -> usize {
        ROUNDS.saturating_sub(self.rounds.len())
    }

    /// The round whose marker may currently be moved.
    pub fn draggable_id(&self) -> Option<usize> {
        self.rounds.iter().position(|r| r.draggable)
    }

    /// Zoom of the round being edited.
    pub fn current_zoom(&self) -> Option<u8> {
        match self.phase {
            CuratorPhase::Zoom { id } => self.rounds.get(id).map(|r| r.zoom),
            _ => None,
        }
    }

    /// Capture a clicked location. Returns how many are now stored.
    pub fn add_location(&mut self, latlng: LatLng) -> Result<usize, CuratorError> {
        match self.phase {
            CuratorPhase::Locations => {}
            CuratorPhase::Zoom { id } => return Err(CuratorError::ZoomSelectionInProgress { round: id }),
            CuratorPhase::Submit => {
                return Err(CuratorError::ZoomSelectionInProgress { round: ROUNDS - 1 })
            }
        }
        if self.rounds.len() >= ROUNDS {
            return Err(CuratorError::TooManyLocations);
        }
        self.rounds.push(CuratorRound {
            id: self.rounds.len() as u32,
            latlng,
            zoom: DEFAULT_ZOOM,
            draggable: false,
        });
        Ok(self.rounds.len())
    }

    /// Finish location capture and start zoom selection on round 0.
    pub fn set_locations(&mut self) -> Result<(), CuratorError> {
        if let CuratorPhase::Zoom { id } = self.phase {
            return Err(CuratorError::ZoomSelectionInProgress { round: id });
        }
        if self.phase == CuratorPhase::Submit {
            return Err(CuratorError::ZoomSelectionInProgress { round: ROUNDS - 1 });
        }
        if self.rounds.len() < ROUNDS {
            return Err(CuratorError::MissingLocations {
                remaining: self.remaining(),
            });
        }
        self.rounds[0].draggable = true;
        self.phase = CuratorPhase::Zoom { id: 0 };
        Ok(())
    }

    /// Reposition the marker of round `id` after a drag.
    pub fn move_marker(&mut self, id: usize, latlng: LatLng) -> Result<(), CuratorError> {
        match self.rounds.get_mut(id) {
            Some(round) if round.draggable && self.phase == (CuratorPhase::Zoom { id }) => {
                round.latlng = latlng;
                Ok(())
            }
            _ => Err(CuratorError::NotDraggable { id }),
        }
    }

    pub fn select_zoom(&mut self, zoom: u8) -> Result<(), CuratorError> {
        let CuratorPhase::Zoom { id } = self.phase else {
            return Err(CuratorError::NotInZoomSelection);
        };
        if !ZOOM_RANGE.contains(&zoom) {
            return Err(CuratorError::ZoomOutOfRange(zoom));
        }
        self.rounds[id].zoom = zoom;
        Ok(())
    }

    /// Lock the current round and move on; after the last one the
    /// submission form opens.
    pub fn next(&mut self) -> Result<CuratorPhase, CuratorError> {
        let CuratorPhase::Zoom { id } = self.phase else {
            return Err(CuratorError::NotInZoomSelection);
        };
        self.rounds[id].draggable = false;
        if id + 1 < ROUNDS {
            self.rounds[id + 1].draggable = true;
            self.phase = CuratorPhase::Zoom { id: id + 1 };
        } else {
            self.phase = CuratorPhase::Submit;
        }
        Ok(self.phase)
    }

    /// Build the challenge to send to the server.
    pub fn submission(
        &self,
        date: &str,
        maplayer: MapLayer,
        moving: bool,
        timed: Option<u32>,
    ) -> Result<DailyChallenge, CuratorError> {
        if self.phase != CuratorPhase::Submit {
            return Err(CuratorError::NotReadyToSubmit);
        }
        let challenge = DailyChallenge {
            date: date.to_string(),
            daily_challenge: self
                .rounds
                .iter()
                .map(|r| ChallengeRound {
                    id: r.id,
                    latlng: r.latlng,
                    zoom: r.zoom,
                })
                .collect(),
            maplayer,
            moving,
            timed,
        };
        challenge.validate()?;
        Ok(challenge)
    }

    /// Drop everything and start over with location capture.
    pub fn reset(&mut self) {
        self.rounds.clear();
        self.phase = CuratorPhase::Locations;
    }
}
