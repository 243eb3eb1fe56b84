//! Store methods for the roster snapshot.

use super::RosterStore;
use crate::{
    error::{DashResult, DashboardError},
    roster::{default_roster, Roster},
    snapshot::RosterSnapshot,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterOrigin {
    /// Read back from storage.
    Stored,
    /// Built-in default (nothing stored, stored copy corrupt, or storage down).
    Default,
}

/// Result of a fail-soft roster load.
#[derive(Debug)]
pub struct RosterLoad {
    pub roster: Roster,
    pub origin: RosterOrigin,
    /// Storage problem encountered on the way, if any. Never fatal.
    pub issue:  Option<DashboardError>,
}

impl RosterStore {
    /// Load the roster stored under `key`.
    ///
    /// Absent or corrupt blobs fall back to the default roster, which is
    /// persisted straight away. Read failures fall back too, but nothing is
    /// written.
    pub fn load_roster(&self, key: &str) -> RosterLoad {
        let blob = match self.read_blob(key) {
            Ok(blob) => blob,
            Err(e) => {
                log::warn!("Roster read failed, using default roster: {e}");
                return RosterLoad {
                    roster: default_roster(),
                    origin: RosterOrigin::Default,
                    issue:  Some(e),
                };
            }
        };

        if let Some(text) = blob {
            match RosterSnapshot::decode(&text) {
                Ok(snapshot) => {
                    let roster = snapshot.into_roster();
                    log::debug!("Loaded {} agents from storage", roster.len());
                    return RosterLoad {
                        roster,
                        origin: RosterOrigin::Stored,
                        issue:  None,
                    };
                }
                Err(e) => log::warn!("Stored roster is corrupt ({e}); resetting to default"),
            }
        } else {
            log::info!("No stored roster under '{key}'; seeding default roster");
        }

        let roster = default_roster();
        let issue = self.save_roster(key, &roster).err();
        if let Some(e) = &issue {
            log::warn!("Could not persist default roster: {e}");
        }
        RosterLoad {
            roster,
            origin: RosterOrigin::Default,
            issue,
        }
    }

    /// Serialize and persist the full roster.
    pub fn save_roster(&self, key: &str, roster: &Roster) -> DashResult<()> {
        let json = RosterSnapshot::from_roster(roster).encode()?;
        self.write_blob(key, &json)?;
        log::debug!("Saved {} agents under '{key}'", roster.len());
        Ok(())
    }
}
