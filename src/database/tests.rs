// Edge-case tests for the user directory, ingest persistence and result views

#[cfg(test)]
mod user_tests {
    use crate::database::Database;
    use tempfile::TempDir;

    fn setup_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(&db_path).unwrap();
        (db, temp_dir)
    }

    #[test]
    fn test_create_user_basic() {
        let (db, _temp) = setup_test_db();
        let id = db.create_user("Ana", "ana@x.com").unwrap();
        assert!(id > 0);

        let users = db.list_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ana");
        assert_eq!(users[0].email, "ana@x.com");
    }

    #[test]
    fn test_duplicate_emails_allowed() {
        let (db, _temp) = setup_test_db();
        // No uniqueness constraint on users: same email twice is two rows.
        db.create_user("Ana", "ana@x.com").unwrap();
        db.create_user("Ana Clone", "ana@x.com").unwrap();
        assert_eq!(db.list_users().unwrap().len(), 2);
    }

    #[test]
    fn test_create_user_unicode() {
        let (db, _temp) = setup_test_db();
        let id = db.create_user("Søren 日本語", "søren@example.dk").unwrap();
        assert!(id > 0);
        assert_eq!(db.list_users().unwrap()[0].name, "Søren 日本語");
    }

    #[test]
    fn test_create_user_special_characters() {
        let (db, _temp) = setup_test_db();
        let names = vec![
            "O'Brien",
            "Quote\"Here",
            "Semi;colon",
            "Drop; DROP TABLE users;--",
        ];
        for name in names {
            let id = db.create_user(name, "x@y.z").unwrap();
            assert!(id > 0, "Failed for name: {}", name);
        }
        assert_eq!(db.list_users().unwrap().len(), 4);
    }

    #[test]
    fn test_get_user() {
        let (db, _temp) = setup_test_db();
        let id = db.create_user("Ana", "ana@x.com").unwrap();

        let user = db.get_user(id).unwrap().unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.email, "ana@x.com");

        assert!(db.get_user(99999).unwrap().is_none());
    }

    #[test]
    fn test_update_user_basic() {
        let (db, _temp) = setup_test_db();
        let id = db.create_user("Old", "old@x.com").unwrap();

        let changed = db.update_user(id, "New", "new@x.com").unwrap();
        assert_eq!(changed, 1);

        let user = db.get_user(id).unwrap().unwrap();
        assert_eq!(user.name, "New");
        assert_eq!(user.email, "new@x.com");
    }

    #[test]
    fn test_update_nonexistent_user_is_noop() {
        let (db, _temp) = setup_test_db();
        db.create_user("Ana", "ana@x.com").unwrap();

        let changed = db.update_user(99999, "Ghost", "ghost@x.com").unwrap();
        assert_eq!(changed, 0);

        // The existing row is untouched.
        assert_eq!(db.list_users().unwrap()[0].name, "Ana");
    }

    #[test]
    fn test_delete_user_basic() {
        let (db, _temp) = setup_test_db();
        let id = db.create_user("Gone", "gone@x.com").unwrap();
        db.delete_user(id).unwrap();
        assert!(db.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_delete_nonexistent_user() {
        let (db, _temp) = setup_test_db();
        // No error, just no effect.
        assert!(db.delete_user(99999).is_ok());
    }
}

#[cfg(test)]
mod ingest_tests {
    use crate::database::{Database, IngestRecord};
    use tempfile::TempDir;

    fn setup_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(&db_path).unwrap();
        (db, temp_dir)
    }

    fn sample_record(user_id: i64) -> IngestRecord {
        IngestRecord {
            user_id,
            file_name: "take_one.wav".to_string(),
            upload_date: "2026-08-06 10:00:00".to_string(),
            transcript: "She runs every morning.".to_string(),
            grammar_findings: vec![(
                "Possible agreement error".to_string(),
                "run, ran".to_string(),
            )],
            pos_tags: vec![
                ("She".to_string(), "PRON".to_string(), "PRP".to_string()),
                ("runs".to_string(), "VERB".to_string(), "VBZ".to_string()),
                (".".to_string(), "PUNCT".to_string(), ".".to_string()),
            ],
            emotion: "calm".to_string(),
            fluency_score: 0.4,
            wpm: 60.0,
            pitch: 180.5,
            volume: 0.12,
            clarity: 0.08,
        }
    }

    #[test]
    fn test_record_ingest_writes_one_of_each() {
        let (db, _temp) = setup_test_db();
        let user_id = db.create_user("Ana", "ana@x.com").unwrap();

        let ids = db.record_ingest(&sample_record(user_id)).unwrap();
        assert!(ids.file_id > 0);
        assert!(ids.transcription_id > 0);

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.audio_files, 1);
        assert_eq!(stats.transcriptions, 1);
        assert_eq!(stats.grammar_findings, 1);
        assert_eq!(stats.pos_tags, 3);
        assert_eq!(stats.emotions, 1);
        assert_eq!(stats.voice_qualities, 1);
    }

    #[test]
    fn test_record_ingest_requires_live_user() {
        let (db, _temp) = setup_test_db();
        // FK violation: no such user. Nothing may be left behind.
        let result = db.record_ingest(&sample_record(99999));
        assert!(result.is_err());

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.audio_files, 0);
        assert_eq!(stats.transcriptions, 0);
        assert_eq!(stats.grammar_findings, 0);
        assert_eq!(stats.pos_tags, 0);
        assert_eq!(stats.emotions, 0);
        assert_eq!(stats.voice_qualities, 0);
    }

    #[test]
    fn test_record_ingest_with_no_findings_or_tags() {
        let (db, _temp) = setup_test_db();
        let user_id = db.create_user("Ana", "ana@x.com").unwrap();

        let mut record = sample_record(user_id);
        record.transcript = String::new();
        record.grammar_findings.clear();
        record.pos_tags.clear();

        db.record_ingest(&record).unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.transcriptions, 1);
        assert_eq!(stats.grammar_findings, 0);
        assert_eq!(stats.pos_tags, 0);
    }

    #[test]
    fn test_list_audio_files_newest_first() {
        let (db, _temp) = setup_test_db();
        let user_id = db.create_user("Ana", "ana@x.com").unwrap();

        let mut first = sample_record(user_id);
        first.file_name = "first.wav".to_string();
        db.record_ingest(&first).unwrap();

        let mut second = sample_record(user_id);
        second.file_name = "second.wav".to_string();
        db.record_ingest(&second).unwrap();

        let files = db.list_audio_files(user_id).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name, "second.wav");
        assert_eq!(files[1].file_name, "first.wav");
    }
}

#[cfg(test)]
mod cascade_tests {
    use crate::database::{Database, IngestRecord};
    use tempfile::TempDir;

    fn setup_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(&db_path).unwrap();
        (db, temp_dir)
    }

    fn record_with_three_tags(user_id: i64, file_name: &str) -> IngestRecord {
        IngestRecord {
            user_id,
            file_name: file_name.to_string(),
            upload_date: "2026-08-06 10:00:00".to_string(),
            transcript: "One two three".to_string(),
            grammar_findings: vec![("Issue".to_string(), "fix".to_string())],
            pos_tags: vec![
                ("One".to_string(), "NUM".to_string(), "CD".to_string()),
                ("two".to_string(), "NUM".to_string(), "CD".to_string()),
                ("three".to_string(), "NUM".to_string(), "CD".to_string()),
            ],
            emotion: "neutral".to_string(),
            fluency_score: 0.1,
            wpm: 15.0,
            pitch: 0.0,
            volume: 0.0,
            clarity: 0.0,
        }
    }

    #[test]
    fn test_delete_user_removes_full_subtree() {
        let (db, _temp) = setup_test_db();
        let user_id = db.create_user("Ana", "ana@x.com").unwrap();

        // Two audio files, each with one transcription and three POS tags.
        db.record_ingest(&record_with_three_tags(user_id, "a.wav"))
            .unwrap();
        db.record_ingest(&record_with_three_tags(user_id, "b.wav"))
            .unwrap();

        let before = db.get_stats().unwrap();
        assert_eq!(before.audio_files, 2);
        assert_eq!(before.transcriptions, 2);
        assert_eq!(before.pos_tags, 6);

        db.delete_user(user_id).unwrap();

        let after = db.get_stats().unwrap();
        assert_eq!(after.users, 0);
        assert_eq!(after.audio_files, 0);
        assert_eq!(after.transcriptions, 0);
        assert_eq!(after.grammar_findings, 0);
        assert_eq!(after.pos_tags, 0);
        assert_eq!(after.emotions, 0);
        assert_eq!(after.voice_qualities, 0);
    }

    #[test]
    fn test_delete_one_user_leaves_others_intact() {
        let (db, _temp) = setup_test_db();
        let keep = db.create_user("Keep", "keep@x.com").unwrap();
        let doomed = db.create_user("Doomed", "doomed@x.com").unwrap();

        db.record_ingest(&record_with_three_tags(keep, "keep.wav"))
            .unwrap();
        db.record_ingest(&record_with_three_tags(doomed, "doomed.wav"))
            .unwrap();

        db.delete_user(doomed).unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.users, 1);
        assert_eq!(stats.audio_files, 1);
        assert_eq!(stats.transcriptions, 1);
        assert_eq!(stats.grammar_findings, 1);
        assert_eq!(stats.pos_tags, 3);
        assert_eq!(stats.emotions, 1);
        assert_eq!(stats.voice_qualities, 1);

        assert_eq!(db.list_audio_files(keep).unwrap().len(), 1);
    }
}

#[cfg(test)]
mod view_tests {
    use crate::database::{Database, IngestRecord};
    use tempfile::TempDir;

    fn setup_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(&db_path).unwrap();
        (db, temp_dir)
    }

    fn record_with(
        user_id: i64,
        transcript: &str,
        findings: usize,
        tags: usize,
        emotion: &str,
    ) -> IngestRecord {
        IngestRecord {
            user_id,
            file_name: "clip.wav".to_string(),
            upload_date: "2026-08-06 10:00:00".to_string(),
            transcript: transcript.to_string(),
            grammar_findings: (0..findings)
                .map(|i| (format!("issue {}", i), format!("fix {}", i)))
                .collect(),
            pos_tags: (0..tags)
                .map(|i| (format!("tok{}", i), "NOUN".to_string(), "NN".to_string()))
                .collect(),
            emotion: emotion.to_string(),
            fluency_score: 0.5,
            wpm: 75.0,
            pitch: 200.0,
            volume: 0.1,
            clarity: 0.05,
        }
    }

    #[test]
    fn test_views_empty_database() {
        let (db, _temp) = setup_test_db();
        assert!(db.latest_transcription().unwrap().is_none());
        assert!(db.recent_grammar_findings(10).unwrap().is_empty());
        assert!(db.recent_pos_tags(10).unwrap().is_empty());
        assert!(db.latest_emotion().unwrap().is_none());
        assert!(db.latest_voice_quality().unwrap().is_none());
    }

    #[test]
    fn test_latest_views_show_newest_ingest() {
        let (db, _temp) = setup_test_db();
        let user_id = db.create_user("Ana", "ana@x.com").unwrap();

        db.record_ingest(&record_with(user_id, "older take", 1, 1, "sad"))
            .unwrap();
        let newest = db
            .record_ingest(&record_with(user_id, "newer take", 1, 1, "happy"))
            .unwrap();

        let transcription = db.latest_transcription().unwrap().unwrap();
        assert_eq!(transcription.text, "newer take");
        assert_eq!(transcription.transcription_id, newest.transcription_id);

        let emotion = db.latest_emotion().unwrap().unwrap();
        assert_eq!(emotion.emotion, "happy");
        assert_eq!(emotion.transcription_id, newest.transcription_id);

        let vq = db.latest_voice_quality().unwrap().unwrap();
        assert_eq!(vq.transcription_id, newest.transcription_id);
        assert_eq!(vq.score, 0.5);
    }

    #[test]
    fn test_recent_views_cap_at_limit() {
        let (db, _temp) = setup_test_db();
        let user_id = db.create_user("Ana", "ana@x.com").unwrap();

        // One ingest with more findings and tags than any view shows.
        db.record_ingest(&record_with(user_id, "long take", 15, 25, "neutral"))
            .unwrap();

        let findings = db.recent_grammar_findings(10).unwrap();
        assert_eq!(findings.len(), 10);
        // Newest first: the highest-numbered finding leads.
        assert_eq!(findings[0].issue, "issue 14");

        let tags = db.recent_pos_tags(10).unwrap();
        assert_eq!(tags.len(), 10);
        assert_eq!(tags[0].token, "tok24");
    }

    #[test]
    fn test_voice_quality_score_mirrors_fluency() {
        let (db, _temp) = setup_test_db();
        let user_id = db.create_user("Ana", "ana@x.com").unwrap();
        db.record_ingest(&record_with(user_id, "take", 0, 0, "calm"))
            .unwrap();

        let vq = db.latest_voice_quality().unwrap().unwrap();
        let emotion = db.latest_emotion().unwrap().unwrap();
        assert_eq!(vq.score, emotion.fluency_score);
    }
}
