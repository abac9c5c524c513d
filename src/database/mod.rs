pub mod models;

#[cfg(test)]
mod tests;

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub use models::*;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        // WAL for concurrent reads; foreign_keys is per-connection and must
        // be on for the cascade deletes to fire.
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
        ",
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.init_schema()?;

        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS audio_files (
                file_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                file_name TEXT NOT NULL,
                upload_date TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(user_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_audio_files_user ON audio_files(user_id);

            CREATE TABLE IF NOT EXISTS transcriptions (
                transcription_id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_id INTEGER NOT NULL UNIQUE,
                text TEXT NOT NULL,
                FOREIGN KEY (file_id) REFERENCES audio_files(file_id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS grammar_findings (
                grammar_id INTEGER PRIMARY KEY AUTOINCREMENT,
                transcription_id INTEGER NOT NULL,
                issue TEXT NOT NULL,
                suggestion TEXT NOT NULL,
                FOREIGN KEY (transcription_id) REFERENCES transcriptions(transcription_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_grammar_transcription
                ON grammar_findings(transcription_id);

            CREATE TABLE IF NOT EXISTS pos_tags (
                pos_id INTEGER PRIMARY KEY AUTOINCREMENT,
                transcription_id INTEGER NOT NULL,
                token TEXT NOT NULL,
                pos_tag TEXT NOT NULL,
                full_tag TEXT NOT NULL,
                FOREIGN KEY (transcription_id) REFERENCES transcriptions(transcription_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_pos_tags_transcription
                ON pos_tags(transcription_id);

            CREATE TABLE IF NOT EXISTS emotions (
                emotion_id INTEGER PRIMARY KEY AUTOINCREMENT,
                transcription_id INTEGER NOT NULL UNIQUE,
                emotion TEXT NOT NULL,
                fluency_score REAL NOT NULL,
                wpm REAL NOT NULL,
                FOREIGN KEY (transcription_id) REFERENCES transcriptions(transcription_id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS voice_qualities (
                vq_id INTEGER PRIMARY KEY AUTOINCREMENT,
                transcription_id INTEGER NOT NULL UNIQUE,
                pitch REAL NOT NULL,
                volume REAL NOT NULL,
                clarity REAL NOT NULL,
                score REAL NOT NULL,
                FOREIGN KEY (transcription_id) REFERENCES transcriptions(transcription_id) ON DELETE CASCADE
            );
        "#,
        )?;

        Ok(())
    }

    // =========================================================================
    // User directory
    // =========================================================================

    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT user_id, name, email FROM users")?;
        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    user_id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                "SELECT user_id, name, email FROM users WHERE user_id = ?",
                params![user_id],
                |row| {
                    Ok(User {
                        user_id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub fn create_user(&self, name: &str, email: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO users (name, email) VALUES (?, ?)",
            params![name, email],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Returns the number of rows changed (0 when the id matches nothing).
    pub fn update_user(&self, user_id: i64, name: &str, email: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE users SET name = ?, email = ? WHERE user_id = ?",
            params![name, email, user_id],
        )?;
        Ok(changed)
    }

    /// Cascades to audio files, transcriptions and every derived analysis.
    pub fn delete_user(&self, user_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM users WHERE user_id = ?", params![user_id])?;
        Ok(())
    }

    // =========================================================================
    // Ingest persistence
    // =========================================================================

    /// Write everything one ingest produced in a single transaction.
    ///
    /// Either the audio file, its transcription and every analysis row land
    /// together, or nothing does; a failure in any insert rolls the whole
    /// ingest back.
    pub fn record_ingest(&self, record: &IngestRecord) -> Result<IngestIds> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO audio_files (user_id, file_name, upload_date) VALUES (?, ?, ?)",
            params![record.user_id, record.file_name, record.upload_date],
        )?;
        let file_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO transcriptions (file_id, text) VALUES (?, ?)",
            params![file_id, record.transcript],
        )?;
        let transcription_id = tx.last_insert_rowid();

        for (issue, suggestion) in &record.grammar_findings {
            tx.execute(
                "INSERT INTO grammar_findings (transcription_id, issue, suggestion) VALUES (?, ?, ?)",
                params![transcription_id, issue, suggestion],
            )?;
        }

        for (token, pos_tag, full_tag) in &record.pos_tags {
            tx.execute(
                "INSERT INTO pos_tags (transcription_id, token, pos_tag, full_tag) VALUES (?, ?, ?, ?)",
                params![transcription_id, token, pos_tag, full_tag],
            )?;
        }

        tx.execute(
            "INSERT INTO emotions (transcription_id, emotion, fluency_score, wpm) VALUES (?, ?, ?, ?)",
            params![
                transcription_id,
                record.emotion,
                record.fluency_score,
                record.wpm
            ],
        )?;

        tx.execute(
            "INSERT INTO voice_qualities (transcription_id, pitch, volume, clarity, score) VALUES (?, ?, ?, ?, ?)",
            params![
                transcription_id,
                record.pitch,
                record.volume,
                record.clarity,
                record.fluency_score
            ],
        )?;

        tx.commit()?;

        Ok(IngestIds {
            file_id,
            transcription_id,
        })
    }

    // =========================================================================
    // Result views
    // =========================================================================

    pub fn latest_transcription(&self) -> Result<Option<Transcription>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT transcription_id, file_id, text FROM transcriptions
                 ORDER BY transcription_id DESC LIMIT 1",
                [],
                |row| {
                    Ok(Transcription {
                        transcription_id: row.get(0)?,
                        file_id: row.get(1)?,
                        text: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn recent_grammar_findings(&self, limit: i64) -> Result<Vec<GrammarFinding>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT grammar_id, transcription_id, issue, suggestion FROM grammar_findings
             ORDER BY grammar_id DESC LIMIT ?",
        )?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(GrammarFinding {
                    grammar_id: row.get(0)?,
                    transcription_id: row.get(1)?,
                    issue: row.get(2)?,
                    suggestion: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn recent_pos_tags(&self, limit: i64) -> Result<Vec<PosTag>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT pos_id, transcription_id, token, pos_tag, full_tag FROM pos_tags
             ORDER BY pos_id DESC LIMIT ?",
        )?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(PosTag {
                    pos_id: row.get(0)?,
                    transcription_id: row.get(1)?,
                    token: row.get(2)?,
                    pos_tag: row.get(3)?,
                    full_tag: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn latest_emotion(&self) -> Result<Option<EmotionResult>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT emotion_id, transcription_id, emotion, fluency_score, wpm FROM emotions
                 ORDER BY emotion_id DESC LIMIT 1",
                [],
                |row| {
                    Ok(EmotionResult {
                        emotion_id: row.get(0)?,
                        transcription_id: row.get(1)?,
                        emotion: row.get(2)?,
                        fluency_score: row.get(3)?,
                        wpm: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn latest_voice_quality(&self) -> Result<Option<VoiceQuality>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT vq_id, transcription_id, pitch, volume, clarity, score FROM voice_qualities
                 ORDER BY vq_id DESC LIMIT 1",
                [],
                |row| {
                    Ok(VoiceQuality {
                        vq_id: row.get(0)?,
                        transcription_id: row.get(1)?,
                        pitch: row.get(2)?,
                        volume: row.get(3)?,
                        clarity: row.get(4)?,
                        score: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    // =========================================================================
    // Stats
    // =========================================================================

    pub fn get_stats(&self) -> Result<AppStats> {
        let conn = self.conn.lock().unwrap();

        let count = |table: &str| -> Result<i64> {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            Ok(conn.query_row(&sql, [], |row| row.get(0))?)
        };

        Ok(AppStats {
            users: count("users")?,
            audio_files: count("audio_files")?,
            transcriptions: count("transcriptions")?,
            grammar_findings: count("grammar_findings")?,
            pos_tags: count("pos_tags")?,
            emotions: count("emotions")?,
            voice_qualities: count("voice_qualities")?,
        })
    }

    pub fn list_audio_files(&self, user_id: i64) -> Result<Vec<AudioFile>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT file_id, user_id, file_name, upload_date FROM audio_files
             WHERE user_id = ? ORDER BY file_id DESC",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(AudioFile {
                    file_id: row.get(0)?,
                    user_id: row.get(1)?,
                    file_name: row.get(2)?,
                    upload_date: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
