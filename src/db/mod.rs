mod codec;
mod schema;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

use crate::models::*;
use crate::session::{CreatedSession, EntityStore, SessionQuery};

const EPIC_COLUMNS: &str = "id, name, description, created_at, updated_at";

const FEATURE_COLUMNS: &str = "id, epic_id, identifier, title, description, status, execution_order, \
     can_parallelize, parallel_group, dependencies, estimated_complexity, started_at, completed_at, \
     created_at, updated_at";

const TASK_COLUMNS: &str = "id, feature_id, identifier, title, description, status, execution_order, \
     can_parallelize, parallel_group, dependencies, estimated_complexity, started_at, completed_at, \
     created_at, updated_at";

const SESSION_COLUMNS: &str = "id, epic_id, external_id, status, started_at, ended_at, \
     items_worked_on, summary, next_steps, blockers, decisions, context_blob";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Default location in the platform data directory.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "spectree")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("spectree.db"))
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Epic operations
    // ============================================================

    pub fn get_all_epics(&self) -> Result<Vec<Epic>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!("SELECT {} FROM epics ORDER BY name", EPIC_COLUMNS))?;
        let epics = stmt
            .query_map([], row_to_epic)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(epics)
    }

    pub fn get_epic(&self, id: Uuid) -> Result<Option<Epic>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let epic = conn
            .query_row(
                &format!("SELECT {} FROM epics WHERE id = ?", EPIC_COLUMNS),
                [id.to_string()],
                row_to_epic,
            )
            .optional()?;
        Ok(epic)
    }

    pub fn get_epic_by_name(&self, name: &str) -> Result<Option<Epic>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let epic = conn
            .query_row(
                &format!("SELECT {} FROM epics WHERE name = ?", EPIC_COLUMNS),
                [name],
                row_to_epic,
            )
            .optional()?;
        Ok(epic)
    }

    /// Resolve an epic by id, falling back to its unique name.
    pub fn find_epic(&self, id_or_name: &str) -> Result<Option<Epic>> {
        if let Ok(id) = Uuid::parse_str(id_or_name) {
            if let Some(epic) = self.get_epic(id)? {
                return Ok(Some(epic));
            }
        }
        self.get_epic_by_name(id_or_name)
    }

    pub fn create_epic(&self, input: CreateEpicInput) -> Result<Epic> {
        if self.get_epic_by_name(&input.name)?.is_some() {
            anyhow::bail!("Epic name '{}' already exists", input.name);
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO epics (id, name, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.name,
                &input.description,
                format_datetime(now),
                format_datetime(now),
            ),
        )?;

        Ok(Epic {
            id,
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        })
    }

    // ============================================================
    // Feature operations
    // ============================================================

    pub fn get_feature(&self, id: Uuid) -> Result<Option<Feature>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let feature = conn
            .query_row(
                &format!("SELECT {} FROM features WHERE id = ?", FEATURE_COLUMNS),
                [id.to_string()],
                row_to_feature,
            )
            .optional()?;
        Ok(feature)
    }

    pub fn get_features_by_epic(&self, epic_id: Uuid) -> Result<Vec<Feature>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM features WHERE epic_id = ? ORDER BY created_at, rowid",
            FEATURE_COLUMNS
        ))?;
        let features = stmt
            .query_map([epic_id.to_string()], row_to_feature)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(features)
    }

    pub fn create_feature(&self, epic_id: Uuid, input: CreateFeatureInput) -> Result<Feature> {
        self.get_epic(epic_id)?
            .ok_or_else(|| anyhow::anyhow!("Epic not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();
        let status = input.status.unwrap_or(WorkStatus::Backlog);
        let (started_at, completed_at) = status_timestamps(status, None, now);

        let identifier = match input.identifier {
            Some(identifier) => identifier,
            None => {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM features WHERE epic_id = ?",
                    [epic_id.to_string()],
                    |row| row.get(0),
                )?;
                format!("F-{}", count + 1)
            }
        };

        conn.execute(
            &format!(
                "INSERT INTO features ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                FEATURE_COLUMNS
            ),
            (
                id.to_string(),
                epic_id.to_string(),
                &identifier,
                &input.title,
                &input.description,
                status.as_str(),
                input.execution_order,
                input.can_parallelize,
                &input.parallel_group,
                codec::encode(&input.dependencies)?,
                input.estimated_complexity.map(|c| c.as_str()),
                started_at.map(format_datetime),
                completed_at.map(format_datetime),
                format_datetime(now),
                format_datetime(now),
            ),
        )?;

        Ok(Feature {
            id,
            epic_id,
            identifier,
            title: input.title,
            description: input.description,
            status,
            execution_order: input.execution_order,
            can_parallelize: input.can_parallelize,
            parallel_group: input.parallel_group,
            dependencies: input.dependencies,
            estimated_complexity: input.estimated_complexity,
            started_at,
            completed_at,
            created_at: now,
            updated_at: now,
        })
    }

    /// Move a feature to `status`, stamping `started_at` / `completed_at`.
    pub fn update_feature_status(&self, id: Uuid, status: WorkStatus) -> Result<Option<Feature>> {
        let Some(existing) = self.get_feature(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let (started_at, completed_at) = status_timestamps(status, existing.started_at, now);

        conn.execute(
            "UPDATE features SET status = ?, started_at = ?, completed_at = ?, updated_at = ? WHERE id = ?",
            (
                status.as_str(),
                started_at.map(format_datetime),
                completed_at.map(format_datetime),
                format_datetime(now),
                id.to_string(),
            ),
        )?;

        Ok(Some(Feature {
            status,
            started_at,
            completed_at,
            updated_at: now,
            ..existing
        }))
    }

    pub fn get_features_with_tasks(&self, epic_id: Uuid) -> Result<Vec<FeatureWithTasks>> {
        let features = self.get_features_by_epic(epic_id)?;

        features
            .into_iter()
            .map(|feature| -> Result<FeatureWithTasks> {
                let tasks = self.get_tasks_by_feature(feature.id)?;
                Ok(FeatureWithTasks { feature, tasks })
            })
            .collect()
    }

    // ============================================================
    // Task operations
    // ============================================================

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let task = conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS),
                [id.to_string()],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    pub fn get_tasks_by_feature(&self, feature_id: Uuid) -> Result<Vec<Task>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE feature_id = ? ORDER BY created_at, rowid",
            TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map([feature_id.to_string()], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    pub fn create_task(&self, feature_id: Uuid, input: CreateTaskInput) -> Result<Task> {
        let feature = self
            .get_feature(feature_id)?
            .ok_or_else(|| anyhow::anyhow!("Feature not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();
        let status = input.status.unwrap_or(WorkStatus::Backlog);
        let (started_at, completed_at) = status_timestamps(status, None, now);

        let identifier = match input.identifier {
            Some(identifier) => identifier,
            None => {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM tasks WHERE feature_id = ?",
                    [feature_id.to_string()],
                    |row| row.get(0),
                )?;
                format!("{}-{}", feature.identifier, count + 1)
            }
        };

        conn.execute(
            &format!(
                "INSERT INTO tasks ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                TASK_COLUMNS
            ),
            (
                id.to_string(),
                feature_id.to_string(),
                &identifier,
                &input.title,
                &input.description,
                status.as_str(),
                input.execution_order,
                input.can_parallelize,
                &input.parallel_group,
                codec::encode(&input.dependencies)?,
                input.estimated_complexity.map(|c| c.as_str()),
                started_at.map(format_datetime),
                completed_at.map(format_datetime),
                format_datetime(now),
                format_datetime(now),
            ),
        )?;

        Ok(Task {
            id,
            feature_id,
            identifier,
            title: input.title,
            description: input.description,
            status,
            execution_order: input.execution_order,
            can_parallelize: input.can_parallelize,
            parallel_group: input.parallel_group,
            dependencies: input.dependencies,
            estimated_complexity: input.estimated_complexity,
            started_at,
            completed_at,
            created_at: now,
            updated_at: now,
        })
    }

    /// Move a task to `status`, stamping `started_at` / `completed_at`.
    pub fn update_task_status(&self, id: Uuid, status: WorkStatus) -> Result<Option<Task>> {
        let Some(existing) = self.get_task(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let (started_at, completed_at) = status_timestamps(status, existing.started_at, now);

        conn.execute(
            "UPDATE tasks SET status = ?, started_at = ?, completed_at = ?, updated_at = ? WHERE id = ?",
            (
                status.as_str(),
                started_at.map(format_datetime),
                completed_at.map(format_datetime),
                format_datetime(now),
                id.to_string(),
            ),
        )?;

        Ok(Some(Task {
            status,
            started_at,
            completed_at,
            updated_at: now,
            ..existing
        }))
    }

    /// Title, parent and timing of a feature or task, for completion events.
    pub fn get_item_details(&self, kind: WorkItemKind, id: Uuid) -> Result<Option<ItemDetails>> {
        let sql = match kind {
            WorkItemKind::Feature => {
                "SELECT f.title, f.identifier, e.name, f.status, f.started_at, f.completed_at
                 FROM features f JOIN epics e ON e.id = f.epic_id WHERE f.id = ?"
            }
            WorkItemKind::Task => {
                "SELECT t.title, t.identifier, f.identifier, t.status, t.started_at, t.completed_at
                 FROM tasks t JOIN features f ON f.id = t.feature_id WHERE t.id = ?"
            }
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let details = conn
            .query_row(sql, [id.to_string()], |row| {
                let started_at = row.get::<_, Option<String>>(4)?.map(parse_datetime);
                let completed_at = row.get::<_, Option<String>>(5)?.map(parse_datetime);
                Ok(ItemDetails {
                    title: row.get(0)?,
                    identifier: row.get(1)?,
                    parent_identifier: row.get(2)?,
                    status_name: row.get(3)?,
                    duration_minutes: duration_minutes(started_at, completed_at),
                })
            })
            .optional()?;
        Ok(details)
    }

    // ============================================================
    // Session operations
    // ============================================================

    pub fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        first_session(&conn, "WHERE id = ?", [id.to_string()])
    }

    pub fn get_active_session(&self, epic_id: Uuid) -> Result<Option<Session>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        first_session(
            &conn,
            "WHERE epic_id = ? AND status = 'active'",
            [epic_id.to_string()],
        )
    }

    /// Most recently ended (completed or abandoned) session for an epic.
    pub fn get_last_ended_session(&self, epic_id: Uuid) -> Result<Option<Session>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        first_session(
            &conn,
            "WHERE epic_id = ? AND status != 'active' AND ended_at IS NOT NULL
             ORDER BY ended_at DESC, started_at DESC LIMIT 1",
            [epic_id.to_string()],
        )
    }

    pub fn get_sessions_by_epic(&self, epic_id: Uuid, limit: usize) -> Result<Vec<Session>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        select_sessions(
            &conn,
            "WHERE epic_id = ? ORDER BY started_at DESC, rowid DESC LIMIT ?",
            (epic_id.to_string(), limit as i64),
        )
    }

    /// Insert a new active session, abandoning any active one in the same transaction.
    pub fn insert_session(&self, new: NewSession) -> Result<CreatedSession> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let stale = select_sessions(
            &tx,
            "WHERE epic_id = ? AND status = 'active'",
            [new.epic_id.to_string()],
        )?;

        tx.execute(
            "UPDATE sessions SET status = 'abandoned', ended_at = ? WHERE epic_id = ? AND status = 'active'",
            (format_datetime(new.started_at), new.epic_id.to_string()),
        )?;

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO sessions (id, epic_id, external_id, status, started_at, items_worked_on)
             VALUES (?, ?, ?, 'active', ?, '[]')",
            (
                id.to_string(),
                new.epic_id.to_string(),
                &new.external_id,
                format_datetime(new.started_at),
            ),
        )?;

        tx.commit()?;

        let abandoned = stale
            .into_iter()
            .map(|session| Session {
                status: SessionStatus::Abandoned,
                ended_at: Some(new.started_at),
                ..session
            })
            .collect();

        Ok(CreatedSession {
            session: Session {
                id,
                epic_id: new.epic_id,
                external_id: new.external_id,
                status: SessionStatus::Active,
                started_at: new.started_at,
                ended_at: None,
                items_worked_on: Vec::new(),
                summary: None,
                next_steps: None,
                blockers: None,
                decisions: None,
                context_blob: None,
            },
            abandoned,
        })
    }

    /// Apply a patch to an active session. Terminal sessions are left untouched.
    pub fn patch_session(&self, id: Uuid, patch: SessionPatch) -> Result<Option<Session>> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let Some(existing) = first_session(
            &conn,
            "WHERE id = ? AND status = 'active'",
            [id.to_string()],
        )?
        else {
            return Ok(None);
        };

        let updated = Session {
            status: patch.status.unwrap_or(existing.status),
            ended_at: patch.ended_at.or(existing.ended_at),
            summary: patch.summary.or(existing.summary),
            next_steps: patch.next_steps.or(existing.next_steps),
            blockers: patch.blockers.or(existing.blockers),
            decisions: patch.decisions.or(existing.decisions),
            context_blob: patch.context_blob.or(existing.context_blob),
            ..existing
        };

        let rows = conn.execute(
            "UPDATE sessions SET status = ?, ended_at = ?, summary = ?,
                 next_steps = ?, blockers = ?, decisions = ?, context_blob = ?
             WHERE id = ? AND status = 'active'",
            (
                updated.status.as_str(),
                updated.ended_at.map(format_datetime),
                &updated.summary,
                codec::encode_optional(&updated.next_steps)?,
                codec::encode_optional(&updated.blockers)?,
                codec::encode_optional(&updated.decisions)?,
                &updated.context_blob,
                id.to_string(),
            ),
        )?;

        if rows == 0 {
            return Ok(None);
        }

        Ok(Some(updated))
    }

    /// Append a work-log entry to an active session.
    ///
    /// The read and the write share one IMMEDIATE transaction, so concurrent
    /// appends (from this process or another one on the same file) are never lost.
    pub fn append_work_log(&self, id: Uuid, entry: WorkLogEntry) -> Result<Option<Session>> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(mut session) = first_session(
            &tx,
            "WHERE id = ? AND status = 'active'",
            [id.to_string()],
        )?
        else {
            return Ok(None);
        };

        session.items_worked_on.push(entry);
        tx.execute(
            "UPDATE sessions SET items_worked_on = ? WHERE id = ? AND status = 'active'",
            (codec::encode(&session.items_worked_on)?, id.to_string()),
        )?;
        tx.commit()?;

        Ok(Some(session))
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

impl EntityStore for Database {
    fn find_epic(&self, id_or_name: &str) -> Result<Option<Epic>> {
        Database::find_epic(self, id_or_name)
    }

    fn list_features_with_tasks(&self, epic_id: Uuid) -> Result<Vec<FeatureWithTasks>> {
        self.get_features_with_tasks(epic_id)
    }

    fn find_feature(&self, id: Uuid) -> Result<Option<Feature>> {
        self.get_feature(id)
    }

    fn list_tasks(&self, feature_id: Uuid) -> Result<Vec<Task>> {
        self.get_tasks_by_feature(feature_id)
    }

    fn create_session(&self, new: NewSession) -> Result<CreatedSession> {
        self.insert_session(new)
    }

    fn update_session(&self, id: Uuid, patch: SessionPatch) -> Result<Option<Session>> {
        self.patch_session(id, patch)
    }

    fn append_work_log(&self, id: Uuid, entry: WorkLogEntry) -> Result<Option<Session>> {
        Database::append_work_log(self, id, entry)
    }

    fn find_session(&self, query: SessionQuery) -> Result<Option<Session>> {
        match query {
            SessionQuery::ById(id) => self.get_session(id),
            SessionQuery::ActiveForEpic(epic_id) => self.get_active_session(epic_id),
            SessionQuery::LastEndedForEpic(epic_id) => self.get_last_ended_session(epic_id),
        }
    }

    fn list_sessions(&self, epic_id: Uuid, limit: usize) -> Result<Vec<Session>> {
        self.get_sessions_by_epic(epic_id, limit)
    }

    fn find_item_details(&self, kind: WorkItemKind, id: Uuid) -> Result<Option<ItemDetails>> {
        self.get_item_details(kind, id)
    }
}

fn select_sessions<P: rusqlite::Params>(
    conn: &Connection,
    clause: &str,
    params: P,
) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM sessions {}", SESSION_COLUMNS, clause))?;
    let sessions = stmt
        .query_map(params, row_to_session)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sessions)
}

fn first_session<P: rusqlite::Params>(
    conn: &Connection,
    clause: &str,
    params: P,
) -> Result<Option<Session>> {
    Ok(select_sessions(conn, clause, params)?.into_iter().next())
}

fn row_to_epic(row: &Row) -> rusqlite::Result<Epic> {
    Ok(Epic {
        id: parse_uuid(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_datetime(row.get(3)?),
        updated_at: parse_datetime(row.get(4)?),
    })
}

fn row_to_feature(row: &Row) -> rusqlite::Result<Feature> {
    Ok(Feature {
        id: parse_uuid(row.get(0)?),
        epic_id: parse_uuid(row.get(1)?),
        identifier: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        status: parse_status(row.get(5)?),
        execution_order: row.get(6)?,
        can_parallelize: row.get::<_, i32>(7)? != 0,
        parallel_group: row.get(8)?,
        dependencies: codec::decode_list(row.get(9)?),
        estimated_complexity: parse_complexity(row.get(10)?),
        started_at: row.get::<_, Option<String>>(11)?.map(parse_datetime),
        completed_at: row.get::<_, Option<String>>(12)?.map(parse_datetime),
        created_at: parse_datetime(row.get(13)?),
        updated_at: parse_datetime(row.get(14)?),
    })
}

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: parse_uuid(row.get(0)?),
        feature_id: parse_uuid(row.get(1)?),
        identifier: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        status: parse_status(row.get(5)?),
        execution_order: row.get(6)?,
        can_parallelize: row.get::<_, i32>(7)? != 0,
        parallel_group: row.get(8)?,
        dependencies: codec::decode_list(row.get(9)?),
        estimated_complexity: parse_complexity(row.get(10)?),
        started_at: row.get::<_, Option<String>>(11)?.map(parse_datetime),
        completed_at: row.get::<_, Option<String>>(12)?.map(parse_datetime),
        created_at: parse_datetime(row.get(13)?),
        updated_at: parse_datetime(row.get(14)?),
    })
}

fn row_to_session(row: &Row) -> rusqlite::Result<Session> {
    Ok(Session {
        id: parse_uuid(row.get(0)?),
        epic_id: parse_uuid(row.get(1)?),
        external_id: row.get(2)?,
        status: SessionStatus::from_str(&row.get::<_, String>(3)?)
            .unwrap_or(SessionStatus::Abandoned),
        started_at: parse_datetime(row.get(4)?),
        ended_at: row.get::<_, Option<String>>(5)?.map(parse_datetime),
        items_worked_on: codec::decode_list(row.get(6)?),
        summary: row.get(7)?,
        next_steps: codec::decode_optional(row.get(8)?),
        blockers: codec::decode_optional(row.get(9)?),
        decisions: codec::decode_optional(row.get(10)?),
        context_blob: row.get(11)?,
    })
}

/// `started_at` is set on first entering a started or completed status and
/// kept afterwards; `completed_at` only holds while the item is completed.
fn status_timestamps(
    status: WorkStatus,
    started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    match status.category() {
        StatusCategory::Started => (started_at.or(Some(now)), None),
        StatusCategory::Completed => (started_at.or(Some(now)), Some(now)),
        _ => (started_at, None),
    }
}

fn parse_status(s: String) -> WorkStatus {
    WorkStatus::from_str(&s).unwrap_or(WorkStatus::Backlog)
}

fn parse_complexity(s: Option<String>) -> Option<Complexity> {
    s.and_then(|s| Complexity::from_str(&s).ok())
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

/// Fixed-width RFC 3339 so stored timestamps sort lexicographically.
fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
