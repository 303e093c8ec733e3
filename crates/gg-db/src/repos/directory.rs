//! Directory repository: users, teams, team membership, and equipment.
//!
//! These rows are the facts the lifecycle consults (who may act, who is on
//! which team, which team owns which equipment). Reads use the shared
//! connection. A write that depends on what it reads does both inside one
//! unit of work.

use chrono::Utc;
use tracing::info;

use gg_core::entities::{Equipment, Team, User};
use gg_core::enums::{EquipmentStatus, UserRole};
use gg_core::ids::{PREFIX_EQUIPMENT, PREFIX_TEAM, PREFIX_USER};

use crate::error::{DatabaseError, LifecycleError};
use crate::helpers::{get_bool, get_opt_string, parse_datetime, parse_enum};
use crate::lifecycle::abandon;
use crate::service::GearService;
use crate::unit_of_work::UnitOfWork;

const USER_COLS: &str = "id, name, email, role, is_active, created_at";
const TEAM_COLS: &str = "id, name, description, is_active, created_at";
const EQUIPMENT_COLS: &str = "id, name, serial_number, team_id, status, created_at, updated_at";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: get_opt_string(row, 2)?,
        role: parse_enum(&row.get::<String>(3)?)?,
        is_active: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn row_to_team(row: &libsql::Row) -> Result<Team, DatabaseError> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        is_active: get_bool(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

fn row_to_equipment(row: &libsql::Row) -> Result<Equipment, DatabaseError> {
    Ok(Equipment {
        id: row.get(0)?,
        name: row.get(1)?,
        serial_number: get_opt_string(row, 2)?,
        team_id: row.get(3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

pub(crate) async fn select_user(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Option<User>, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {USER_COLS} FROM users WHERE id = ?1"), [id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_user(&row)?)),
        None => Ok(None),
    }
}

async fn select_team(conn: &libsql::Connection, id: &str) -> Result<Option<Team>, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {TEAM_COLS} FROM teams WHERE id = ?1"), [id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_team(&row)?)),
        None => Ok(None),
    }
}

pub(crate) async fn select_equipment(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Option<Equipment>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {EQUIPMENT_COLS} FROM equipment WHERE id = ?1"),
            [id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_equipment(&row)?)),
        None => Ok(None),
    }
}

async fn require_active_team(
    conn: &libsql::Connection,
    team_id: &str,
) -> Result<Team, LifecycleError> {
    let team = select_team(conn, team_id)
        .await?
        .ok_or_else(|| LifecycleError::not_found("Team", team_id))?;
    if !team.is_active {
        return Err(LifecycleError::Validation(format!(
            "Team {team_id} is inactive"
        )));
    }
    Ok(team)
}

fn require_name(field: &str, value: &str) -> Result<String, LifecycleError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LifecycleError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Translate a UNIQUE failure on `column` into a `Conflict`. Anything else,
/// including a collision on a generated id, passes through unchanged.
fn unique_conflict(e: DatabaseError, column: &str, message: impl FnOnce() -> String) -> LifecycleError {
    if e.violates_unique(column) {
        LifecycleError::Conflict(message())
    } else {
        e.into()
    }
}

impl GearService {
    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub async fn find_user(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        select_user(self.db().conn(), id).await
    }

    /// # Errors
    ///
    /// `NotFound` if no user has this id.
    pub async fn get_user(&self, id: &str) -> Result<User, LifecycleError> {
        self.find_user(id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("User", id))
    }

    /// Create an active user account.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank name, `Conflict` if the email is taken.
    pub async fn create_user(
        &self,
        name: &str,
        email: Option<&str>,
        role: UserRole,
    ) -> Result<User, LifecycleError> {
        let name = require_name("Name", name)?;
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_USER).await?;

        self.db()
            .execute_write(
                &format!("INSERT INTO users ({USER_COLS}) VALUES (?1, ?2, ?3, ?4, 1, ?5)"),
                libsql::params![id.as_str(), name.as_str(), email, role.as_str(), now.to_rfc3339()],
            )
            .await
            .map_err(|e| {
                unique_conflict(e, "users.email", || {
                    format!("A user with email {} already exists", email.unwrap_or_default())
                })
            })?;

        info!(user_id = %id, role = %role, "user created");
        Ok(User {
            id,
            name,
            email: email.map(String::from),
            role,
            is_active: true,
            created_at: now,
        })
    }

    /// Activate or deactivate a user. Inactive users can neither assign nor
    /// be assigned work.
    ///
    /// # Errors
    ///
    /// `NotFound` if no user has this id.
    pub async fn set_user_active(&self, id: &str, active: bool) -> Result<User, LifecycleError> {
        let changed = self
            .db()
            .execute_write(
                "UPDATE users SET is_active = ?1 WHERE id = ?2",
                libsql::params![i64::from(active), id],
            )
            .await?;
        if changed == 0 {
            return Err(LifecycleError::not_found("User", id));
        }
        self.get_user(id).await
    }

    // -----------------------------------------------------------------------
    // Teams
    // -----------------------------------------------------------------------

    pub async fn find_team(&self, id: &str) -> Result<Option<Team>, DatabaseError> {
        select_team(self.db().conn(), id).await
    }

    /// # Errors
    ///
    /// `NotFound` if no team has this id.
    pub async fn get_team(&self, id: &str) -> Result<Team, LifecycleError> {
        self.find_team(id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Team", id))
    }

    /// # Errors
    ///
    /// `Validation` for a blank name, `Conflict` if the name is taken.
    pub async fn create_team(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Team, LifecycleError> {
        let name = require_name("Team name", name)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_TEAM).await?;

        self.db()
            .execute_write(
                &format!("INSERT INTO teams ({TEAM_COLS}) VALUES (?1, ?2, ?3, 1, ?4)"),
                libsql::params![id.as_str(), name.as_str(), description, now.to_rfc3339()],
            )
            .await
            .map_err(|e| {
                unique_conflict(e, "teams.name", || format!("Team \"{name}\" already exists"))
            })?;

        info!(team_id = %id, "team created");
        Ok(Team {
            id,
            name,
            description: description.map(String::from),
            is_active: true,
            created_at: now,
        })
    }

    /// Activate or deactivate a team. An inactive team takes no new members
    /// or equipment; its existing requests are untouched.
    ///
    /// # Errors
    ///
    /// `NotFound` if no team has this id.
    pub async fn set_team_active(&self, id: &str, active: bool) -> Result<Team, LifecycleError> {
        let changed = self
            .db()
            .execute_write(
                "UPDATE teams SET is_active = ?1 WHERE id = ?2",
                libsql::params![i64::from(active), id],
            )
            .await?;
        if changed == 0 {
            return Err(LifecycleError::not_found("Team", id));
        }
        info!(team_id = id, active, "team activation changed");
        self.get_team(id).await
    }

    /// Add a technician to a team.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown team or user, `Validation` for an inactive
    /// team or a user who is not an active technician, `Conflict` if the user
    /// is already a member.
    pub async fn add_team_member(&self, team_id: &str, user_id: &str) -> Result<(), LifecycleError> {
        require_active_team(self.db().conn(), team_id).await?;
        let user = self.get_user(user_id).await?;
        if !user.is_active {
            return Err(LifecycleError::Validation(format!(
                "User {user_id} is inactive"
            )));
        }
        if user.role != UserRole::Technician {
            return Err(LifecycleError::Authorization(
                "Only technicians can be added to maintenance teams".into(),
            ));
        }

        self.db()
            .execute_write(
                "INSERT INTO team_members (team_id, user_id, joined_at) VALUES (?1, ?2, ?3)",
                libsql::params![team_id, user_id, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| {
                unique_conflict(e, "team_members.team_id", || {
                    format!("User {user_id} is already a member of team {team_id}")
                })
            })?;

        info!(team_id, user_id, "team member added");
        Ok(())
    }

    /// Take a technician off a team. Open requests of the team can no longer
    /// be assigned to them; an existing assignment stays.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown team, or a user who is not a member.
    pub async fn remove_team_member(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> Result<(), LifecycleError> {
        self.get_team(team_id).await?;
        let removed = self
            .db()
            .execute_write(
                "DELETE FROM team_members WHERE team_id = ?1 AND user_id = ?2",
                [team_id, user_id],
            )
            .await?;
        if removed == 0 {
            return Err(LifecycleError::not_found("Team member", user_id));
        }
        info!(team_id, user_id, "team member removed");
        Ok(())
    }

    /// Members of a team, by name.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown team.
    pub async fn team_members(&self, team_id: &str) -> Result<Vec<User>, LifecycleError> {
        self.get_team(team_id).await?;
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT u.id, u.name, u.email, u.role, u.is_active, u.created_at \
                 FROM team_members tm JOIN users u ON u.id = tm.user_id \
                 WHERE tm.team_id = ?1 ORDER BY u.name",
                [team_id],
            )
            .await
            .map_err(DatabaseError::from)?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::from)? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    // -----------------------------------------------------------------------
    // Equipment
    // -----------------------------------------------------------------------

    pub async fn find_equipment(&self, id: &str) -> Result<Option<Equipment>, DatabaseError> {
        select_equipment(self.db().conn(), id).await
    }

    /// # Errors
    ///
    /// `NotFound` if no equipment has this id.
    pub async fn get_equipment(&self, id: &str) -> Result<Equipment, LifecycleError> {
        self.find_equipment(id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Equipment", id))
    }

    /// Register operational equipment under a team.
    ///
    /// # Errors
    ///
    /// `NotFound`/`Validation` for a missing or inactive team, `Conflict` if
    /// the serial number is taken.
    pub async fn create_equipment(
        &self,
        name: &str,
        serial_number: Option<&str>,
        team_id: &str,
    ) -> Result<Equipment, LifecycleError> {
        let name = require_name("Equipment name", name)?;
        require_active_team(self.db().conn(), team_id).await?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_EQUIPMENT).await?;

        self.db()
            .execute_write(
                &format!(
                    "INSERT INTO equipment ({EQUIPMENT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                libsql::params![
                    id.as_str(),
                    name.as_str(),
                    serial_number,
                    team_id,
                    EquipmentStatus::Operational.as_str(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| {
                unique_conflict(e, "equipment.serial_number", || {
                    format!(
                        "Equipment with serial number {} already exists",
                        serial_number.unwrap_or_default()
                    )
                })
            })?;

        info!(equipment_id = %id, team_id, "equipment created");
        Ok(Equipment {
            id,
            name,
            serial_number: serial_number.map(String::from),
            team_id: team_id.to_string(),
            status: EquipmentStatus::Operational,
            created_at: now,
            updated_at: now,
        })
    }

    /// Move equipment to another team. Existing requests keep the team they
    /// were created with.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown equipment or team, `Validation` for scrapped
    /// equipment or an inactive team.
    pub async fn reassign_equipment_team(
        &self,
        equipment_id: &str,
        team_id: &str,
    ) -> Result<Equipment, LifecycleError> {
        let uow = self.db().begin().await?;
        let (moved, from) = match reassign_locked(&uow, equipment_id, team_id).await {
            Ok(moved) => moved,
            Err(e) => {
                abandon(uow).await;
                return Err(e);
            }
        };
        uow.commit().await?;
        info!(equipment_id, from = %from, to = team_id, "equipment reassigned");
        Ok(moved)
    }

    /// Set the operational state of equipment. `SCRAPPED` is final.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown equipment, `Validation` if it is already
    /// scrapped.
    pub async fn set_equipment_status(
        &self,
        equipment_id: &str,
        status: EquipmentStatus,
    ) -> Result<Equipment, LifecycleError> {
        let uow = self.db().begin().await?;
        let updated = match set_status_locked(&uow, equipment_id, status).await {
            Ok(updated) => updated,
            Err(e) => {
                abandon(uow).await;
                return Err(e);
            }
        };
        uow.commit().await?;
        info!(equipment_id, status = %status, "equipment status changed");
        Ok(updated)
    }

    /// Mark equipment scrapped. Scrapped equipment accepts no new requests.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown equipment, `Validation` if it is already
    /// scrapped.
    pub async fn scrap_equipment(&self, equipment_id: &str) -> Result<Equipment, LifecycleError> {
        self.set_equipment_status(equipment_id, EquipmentStatus::Scrapped)
            .await
    }
}

async fn locked_equipment(uow: &UnitOfWork, equipment_id: &str) -> Result<Equipment, LifecycleError> {
    select_equipment(uow.conn(), equipment_id)
        .await?
        .ok_or_else(|| LifecycleError::not_found("Equipment", equipment_id))
}

/// Returns the moved equipment and the team it came from.
async fn reassign_locked(
    uow: &UnitOfWork,
    equipment_id: &str,
    team_id: &str,
) -> Result<(Equipment, String), LifecycleError> {
    let equipment = locked_equipment(uow, equipment_id).await?;
    if equipment.status == EquipmentStatus::Scrapped {
        return Err(LifecycleError::Validation(
            "Cannot reassign scrapped equipment".into(),
        ));
    }
    require_active_team(uow.conn(), team_id).await?;

    let now = Utc::now();
    uow.conn()
        .execute(
            "UPDATE equipment SET team_id = ?1, updated_at = ?2 WHERE id = ?3",
            libsql::params![team_id, now.to_rfc3339(), equipment_id],
        )
        .await
        .map_err(DatabaseError::from)?;
    let from = equipment.team_id.clone();
    Ok((
        Equipment {
            team_id: team_id.to_string(),
            updated_at: now,
            ..equipment
        },
        from,
    ))
}

async fn set_status_locked(
    uow: &UnitOfWork,
    equipment_id: &str,
    status: EquipmentStatus,
) -> Result<Equipment, LifecycleError> {
    let equipment = locked_equipment(uow, equipment_id).await?;
    if equipment.status == EquipmentStatus::Scrapped {
        let reason = if status == EquipmentStatus::Scrapped {
            "Equipment is already marked as scrapped"
        } else {
            "Scrapped equipment cannot change status"
        };
        return Err(LifecycleError::Validation(reason.into()));
    }

    let now = Utc::now();
    uow.conn()
        .execute(
            "UPDATE equipment SET status = ?1, updated_at = ?2 WHERE id = ?3",
            libsql::params![status.as_str(), now.to_rfc3339(), equipment_id],
        )
        .await
        .map_err(DatabaseError::from)?;
    Ok(Equipment {
        status,
        updated_at: now,
        ..equipment
    })
}
