use chrono::Utc;
use spectree::db::Database;
use spectree::models::*;
use spectree::session::CreatedSession;
use speculate2::speculate;
use uuid::Uuid;

fn create_test_epic(db: &Database) -> Epic {
    db.create_epic(CreateEpicInput {
        name: "Test Epic".to_string(),
        description: None,
    })
    .expect("Failed to create epic")
}

fn create_test_feature(db: &Database, epic_id: Uuid, title: &str) -> Feature {
    db.create_feature(
        epic_id,
        CreateFeatureInput {
            title: title.to_string(),
            ..Default::default()
        },
    )
    .expect("Failed to create feature")
}

fn start(db: &Database, epic_id: Uuid) -> CreatedSession {
    db.insert_session(NewSession {
        epic_id,
        external_id: None,
        started_at: Utc::now(),
    })
    .expect("Failed to insert session")
}

fn finish(db: &Database, id: Uuid, status: SessionStatus) -> Session {
    db.patch_session(
        id,
        SessionPatch {
            status: Some(status),
            ended_at: Some(Utc::now()),
            ..Default::default()
        },
    )
    .expect("Failed to patch session")
    .expect("Session was not active")
}

fn work_entry(action: &str) -> WorkLogEntry {
    WorkLogEntry {
        kind: WorkItemKind::Task,
        id: Uuid::new_v4(),
        identifier: "F-1-1".to_string(),
        action: action.to_string(),
        timestamp: Utc::now(),
    }
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "epics" {
        describe "create_epic" {
            it "creates an epic with required fields" {
                let epic = db.create_epic(CreateEpicInput {
                    name: "Checkout".to_string(),
                    description: None,
                }).expect("Failed to create epic");

                assert_eq!(epic.name, "Checkout");
                assert!(epic.description.is_none());
            }

            it "rejects a duplicate name" {
                create_test_epic(&db);

                let result = db.create_epic(CreateEpicInput {
                    name: "Test Epic".to_string(),
                    description: Some("again".to_string()),
                });

                let err = result.expect_err("Duplicate name should fail");
                assert!(err.to_string().contains("already exists"));
            }
        }

        describe "find_epic" {
            it "finds an epic by id" {
                let epic = create_test_epic(&db);

                let found = db.find_epic(&epic.id.to_string()).expect("Query failed");
                assert_eq!(found.map(|e| e.id), Some(epic.id));
            }

            it "finds an epic by name" {
                let epic = create_test_epic(&db);

                let found = db.find_epic("Test Epic").expect("Query failed");
                assert_eq!(found.map(|e| e.id), Some(epic.id));
            }

            it "returns None for an unknown epic" {
                let found = db.find_epic(&Uuid::new_v4().to_string()).expect("Query failed");
                assert!(found.is_none());
            }
        }

        describe "get_all_epics" {
            it "returns epics ordered by name" {
                for name in ["Zebra", "Alpha"] {
                    db.create_epic(CreateEpicInput {
                        name: name.to_string(),
                        description: None,
                    }).expect("Failed to create");
                }

                let epics = db.get_all_epics().expect("Query failed");
                let names: Vec<&str> = epics.iter().map(|e| e.name.as_str()).collect();
                assert_eq!(names, vec!["Alpha", "Zebra"]);
            }
        }
    }

    describe "features" {
        describe "create_feature" {
            it "assigns sequential identifiers" {
                let epic = create_test_epic(&db);

                let first = create_test_feature(&db, epic.id, "First");
                let second = create_test_feature(&db, epic.id, "Second");

                assert_eq!(first.identifier, "F-1");
                assert_eq!(second.identifier, "F-2");
                assert_eq!(first.status, WorkStatus::Backlog);
            }

            it "keeps an explicit identifier" {
                let epic = create_test_epic(&db);

                let feature = db.create_feature(epic.id, CreateFeatureInput {
                    identifier: Some("AUTH".to_string()),
                    title: "Auth".to_string(),
                    ..Default::default()
                }).expect("Failed to create feature");

                assert_eq!(feature.identifier, "AUTH");
            }

            it "stores scheduling attributes" {
                let epic = create_test_epic(&db);
                let base = create_test_feature(&db, epic.id, "Base");

                let created = db.create_feature(epic.id, CreateFeatureInput {
                    title: "Parallel".to_string(),
                    execution_order: Some(2),
                    can_parallelize: true,
                    parallel_group: Some("ui".to_string()),
                    dependencies: vec![base.id],
                    estimated_complexity: Some(Complexity::Moderate),
                    ..Default::default()
                }).expect("Failed to create feature");

                let stored = db.get_feature(created.id).expect("Query failed").expect("Not found");
                assert_eq!(stored.execution_order, Some(2));
                assert!(stored.can_parallelize);
                assert_eq!(stored.parallel_group.as_deref(), Some("ui"));
                assert_eq!(stored.dependencies, vec![base.id]);
                assert_eq!(stored.estimated_complexity, Some(Complexity::Moderate));
            }

            it "fails for a missing epic" {
                let result = db.create_feature(Uuid::new_v4(), CreateFeatureInput {
                    title: "Orphan".to_string(),
                    ..Default::default()
                });
                assert!(result.is_err());
            }
        }

        describe "update_feature_status" {
            it "stamps started_at when work starts" {
                let epic = create_test_epic(&db);
                let feature = create_test_feature(&db, epic.id, "F");

                let updated = db.update_feature_status(feature.id, WorkStatus::InProgress)
                    .expect("Update failed")
                    .expect("Not found");

                assert_eq!(updated.status, WorkStatus::InProgress);
                assert!(updated.started_at.is_some());
                assert!(updated.completed_at.is_none());
            }

            it "keeps started_at and stamps completed_at on completion" {
                let epic = create_test_epic(&db);
                let feature = create_test_feature(&db, epic.id, "F");

                let started = db.update_feature_status(feature.id, WorkStatus::InProgress)
                    .expect("Update failed")
                    .expect("Not found");
                let done = db.update_feature_status(feature.id, WorkStatus::Done)
                    .expect("Update failed")
                    .expect("Not found");

                assert_eq!(done.started_at, started.started_at);
                assert!(done.completed_at.is_some());

                let stored = db.get_feature(feature.id).expect("Query failed").expect("Not found");
                assert_eq!(stored.status, WorkStatus::Done);
                assert_eq!(stored.completed_at, done.completed_at);
            }

            it "returns None for a missing feature" {
                let result = db.update_feature_status(Uuid::new_v4(), WorkStatus::Done)
                    .expect("Update failed");
                assert!(result.is_none());
            }
        }

        describe "get_features_with_tasks" {
            it "nests tasks under their feature in creation order" {
                let epic = create_test_epic(&db);
                let feature = create_test_feature(&db, epic.id, "F");
                for title in ["one", "two"] {
                    db.create_task(feature.id, CreateTaskInput {
                        title: title.to_string(),
                        ..Default::default()
                    }).expect("Failed to create task");
                }

                let features = db.get_features_with_tasks(epic.id).expect("Query failed");
                assert_eq!(features.len(), 1);
                let identifiers: Vec<&str> = features[0].tasks.iter().map(|t| t.identifier.as_str()).collect();
                assert_eq!(identifiers, vec!["F-1-1", "F-1-2"]);
            }
        }
    }

    describe "item details" {
        it "uses the feature identifier as parent of a task" {
            let epic = create_test_epic(&db);
            let feature = create_test_feature(&db, epic.id, "F");
            let task = db.create_task(feature.id, CreateTaskInput {
                title: "Write it".to_string(),
                ..Default::default()
            }).expect("Failed to create task");
            db.update_task_status(task.id, WorkStatus::Done).expect("Update failed");

            let details = db.get_item_details(WorkItemKind::Task, task.id)
                .expect("Query failed")
                .expect("Not found");

            assert_eq!(details.title, "Write it");
            assert_eq!(details.identifier, "F-1-1");
            assert_eq!(details.parent_identifier.as_deref(), Some("F-1"));
            assert_eq!(details.status_name, "done");
            assert_eq!(details.duration_minutes, Some(0));
        }

        it "uses the epic name as parent of a feature" {
            let epic = create_test_epic(&db);
            let feature = create_test_feature(&db, epic.id, "F");

            let details = db.get_item_details(WorkItemKind::Feature, feature.id)
                .expect("Query failed")
                .expect("Not found");

            assert_eq!(details.parent_identifier.as_deref(), Some("Test Epic"));
            assert!(details.duration_minutes.is_none());
        }

        it "returns None when the kind does not match the id" {
            let epic = create_test_epic(&db);
            let feature = create_test_feature(&db, epic.id, "F");

            let details = db.get_item_details(WorkItemKind::Task, feature.id).expect("Query failed");
            assert!(details.is_none());
        }
    }

    describe "sessions" {
        describe "insert_session" {
            it "creates an active session with an empty work log" {
                let epic = create_test_epic(&db);

                let created = start(&db, epic.id);

                assert_eq!(created.session.status, SessionStatus::Active);
                assert!(created.session.items_worked_on.is_empty());
                assert!(created.abandoned.is_empty());

                let active = db.get_active_session(epic.id).expect("Query failed");
                assert_eq!(active.map(|s| s.id), Some(created.session.id));
            }

            it "abandons the previously active session" {
                let epic = create_test_epic(&db);
                let first = start(&db, epic.id);

                let second = start(&db, epic.id);

                assert_eq!(second.abandoned.len(), 1);
                assert_eq!(second.abandoned[0].id, first.session.id);

                let old = db.get_session(first.session.id).expect("Query failed").expect("Not found");
                assert_eq!(old.status, SessionStatus::Abandoned);
                assert_eq!(old.ended_at, Some(second.session.started_at));

                let active = db.get_active_session(epic.id).expect("Query failed");
                assert_eq!(active.map(|s| s.id), Some(second.session.id));
            }

            it "keeps sessions of other epics active" {
                let epic = create_test_epic(&db);
                let other = db.create_epic(CreateEpicInput {
                    name: "Other".to_string(),
                    description: None,
                }).expect("Failed to create epic");

                let mine = start(&db, epic.id);
                let theirs = start(&db, other.id);

                assert!(theirs.abandoned.is_empty());
                let active = db.get_active_session(epic.id).expect("Query failed");
                assert_eq!(active.map(|s| s.id), Some(mine.session.id));
            }
        }

        describe "patch_session" {
            it "persists handoff fields" {
                let epic = create_test_epic(&db);
                let created = start(&db, epic.id);

                db.patch_session(created.session.id, SessionPatch {
                    status: Some(SessionStatus::Completed),
                    ended_at: Some(Utc::now()),
                    summary: Some("Did the thing".to_string()),
                    next_steps: Some(vec!["Ship it".to_string()]),
                    decisions: Some(vec![Decision {
                        decision: "Use SQLite".to_string(),
                        rationale: None,
                    }]),
                    ..Default::default()
                }).expect("Patch failed");

                let stored = db.get_session(created.session.id).expect("Query failed").expect("Not found");
                assert_eq!(stored.status, SessionStatus::Completed);
                assert_eq!(stored.summary.as_deref(), Some("Did the thing"));
                assert_eq!(stored.next_steps, Some(vec!["Ship it".to_string()]));
                assert!(stored.blockers.is_none());
                assert_eq!(stored.decisions.map(|d| d.len()), Some(1));
            }

            it "leaves terminal sessions untouched" {
                let epic = create_test_epic(&db);
                let created = start(&db, epic.id);
                finish(&db, created.session.id, SessionStatus::Abandoned);

                let result = db.patch_session(created.session.id, SessionPatch {
                    status: Some(SessionStatus::Completed),
                    summary: Some("too late".to_string()),
                    ..Default::default()
                }).expect("Patch failed");

                assert!(result.is_none());
                let stored = db.get_session(created.session.id).expect("Query failed").expect("Not found");
                assert_eq!(stored.status, SessionStatus::Abandoned);
                assert!(stored.summary.is_none());
            }
        }

        describe "append_work_log" {
            it "appends to the stored log" {
                let epic = create_test_epic(&db);
                let created = start(&db, epic.id);

                db.append_work_log(created.session.id, work_entry("started")).expect("Append failed");
                let session = db.append_work_log(created.session.id, work_entry("completed"))
                    .expect("Append failed")
                    .expect("Session was not active");

                assert_eq!(session.items_worked_on.len(), 2);
                let stored = db.get_session(created.session.id).expect("Query failed").expect("Not found");
                let actions: Vec<&str> = stored.items_worked_on.iter().map(|e| e.action.as_str()).collect();
                assert_eq!(actions, vec!["started", "completed"]);
            }

            it "leaves terminal sessions untouched" {
                let epic = create_test_epic(&db);
                let created = start(&db, epic.id);
                finish(&db, created.session.id, SessionStatus::Completed);

                let result = db.append_work_log(created.session.id, work_entry("started")).expect("Append failed");

                assert!(result.is_none());
                let stored = db.get_session(created.session.id).expect("Query failed").expect("Not found");
                assert!(stored.items_worked_on.is_empty());
            }
        }

        describe "get_last_ended_session" {
            it "ignores the active session" {
                let epic = create_test_epic(&db);
                start(&db, epic.id);

                let last = db.get_last_ended_session(epic.id).expect("Query failed");
                assert!(last.is_none());
            }

            it "returns the most recently ended session" {
                let epic = create_test_epic(&db);
                let first = start(&db, epic.id);
                finish(&db, first.session.id, SessionStatus::Completed);
                let second = start(&db, epic.id);
                finish(&db, second.session.id, SessionStatus::Abandoned);

                let last = db.get_last_ended_session(epic.id).expect("Query failed");
                assert_eq!(last.map(|s| s.id), Some(second.session.id));
            }
        }

        describe "get_sessions_by_epic" {
            it "returns newest first up to the limit" {
                let epic = create_test_epic(&db);
                let ids: Vec<Uuid> = (0..3).map(|_| start(&db, epic.id).session.id).collect();

                let sessions = db.get_sessions_by_epic(epic.id, 2).expect("Query failed");

                let found: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
                assert_eq!(found, vec![ids[2], ids[1]]);
            }
        }
    }
}
