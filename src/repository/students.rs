//! Students repository

use async_trait::async_trait;

use super::{Repository, StudentStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        student::{CreateStudent, UpdateStudent},
        Student,
    },
};

const STUDENT_SELECT: &str = r#"
    SELECT s.*, CONCAT(u.first_name, ' ', u.last_name) AS display_name
    FROM students s
    JOIN users u ON u.id = s.user_id
"#;

#[async_trait]
impl StudentStore for Repository {
    async fn create_student(&self, data: &CreateStudent) -> AppResult<Student> {
        // Unknown user_id surfaces as a foreign-key violation, i.e. NotFound
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO students (user_id, student_number) VALUES ($1, $2) RETURNING id",
        )
        .bind(data.user_id)
        .bind(&data.student_number)
        .fetch_one(&self.pool)
        .await?;

        self.get_student(id, false).await
    }

    async fn get_student(&self, id: i32, include_deleted: bool) -> AppResult<Student> {
        let query = format!("{} WHERE s.id = $1 AND ($2 OR s.deleted_at IS NULL)", STUDENT_SELECT);
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student {} not found", id)))
    }

    async fn get_student_by_user(&self, user_id: i32) -> AppResult<Student> {
        let query = format!("{} WHERE s.user_id = $1 AND s.deleted_at IS NULL", STUDENT_SELECT);
        sqlx::query_as::<_, Student>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No student record for user {}", user_id)))
    }

    async fn list_students(&self, include_deleted: bool) -> AppResult<Vec<Student>> {
        let query = format!("{} WHERE $1 OR s.deleted_at IS NULL ORDER BY s.student_number", STUDENT_SELECT);
        let students = sqlx::query_as::<_, Student>(&query)
            .bind(include_deleted)
            .fetch_all(&self.pool)
            .await?;
        Ok(students)
    }

    async fn update_student(&self, id: i32, data: &UpdateStudent) -> AppResult<Student> {
        let result = sqlx::query(
            "UPDATE students SET student_number = $2, updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(&data.student_number)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Student {} not found", id)));
        }
        self.get_student(id, false).await
    }

    async fn delete_student(&self, id: i32) -> AppResult<()> {
        let mut tx = self.begin().await?;

        let student_id: i32 = sqlx::query_scalar(
            "SELECT id FROM students WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Student {} not found", id)))?;

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrows WHERE student_id = $1 AND date_returned IS NULL AND deleted_at IS NULL",
        )
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;
        if active > 0 {
            return Err(AppError::Conflict(format!(
                "Student {} still holds {} borrowed book(s)",
                student_id, active
            )));
        }

        sqlx::query("UPDATE students SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(student_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
