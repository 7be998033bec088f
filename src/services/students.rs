//! Users and students

use std::{sync::Arc, time::Duration};

use validator::Validate;

use super::bounded;
use crate::{
    error::AppResult,
    models::{
        student::{CreateStudent, UpdateStudent},
        user::CreateUser,
        Student, User,
    },
    repository::{LibraryStore, StudentStore, UserStore},
};

#[derive(Clone)]
pub struct StudentsService {
    store: Arc<dyn LibraryStore>,
    limit: Duration,
}

impl StudentsService {
    pub fn new(store: Arc<dyn LibraryStore>, limit: Duration) -> Self {
        Self { store, limit }
    }

    pub async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        data.validate()?;
        let user = bounded(self.limit, "create_user", self.store.create_user(&data)).await?;
        tracing::info!(user_id = user.id, "user created");
        Ok(user)
    }

    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        bounded(self.limit, "get_user", self.store.get_user(id)).await
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        bounded(self.limit, "list_users", self.store.list_users()).await
    }

    pub async fn create_student(&self, data: CreateStudent) -> AppResult<Student> {
        data.validate()?;
        let student = bounded(self.limit, "create_student", self.store.create_student(&data)).await?;
        tracing::info!(student_id = student.id, user_id = student.user_id, "student enrolled");
        Ok(student)
    }

    pub async fn get_student(&self, id: i32, include_deleted: bool) -> AppResult<Student> {
        bounded(self.limit, "get_student", self.store.get_student(id, include_deleted)).await
    }

    /// Student record linked to a user account
    pub async fn student_for_user(&self, user_id: i32) -> AppResult<Student> {
        bounded(self.limit, "get_student_by_user", self.store.get_student_by_user(user_id)).await
    }

    pub async fn list_students(&self, include_deleted: bool) -> AppResult<Vec<Student>> {
        bounded(self.limit, "list_students", self.store.list_students(include_deleted)).await
    }

    pub async fn update_student(&self, id: i32, data: UpdateStudent) -> AppResult<Student> {
        data.validate()?;
        bounded(self.limit, "update_student", self.store.update_student(id, &data)).await
    }

    pub async fn delete_student(&self, id: i32) -> AppResult<()> {
        bounded(self.limit, "delete_student", self.store.delete_student(id)).await?;
        tracing::info!(student_id = id, "student deleted");
        Ok(())
    }
}
