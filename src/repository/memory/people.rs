//! Users and students

use async_trait::async_trait;
use chrono::Utc;

use super::{InMemoryStore, State};
use crate::{
    error::{AppError, AppResult},
    models::{
        student::{CreateStudent, UpdateStudent},
        user::CreateUser,
        Student, User,
    },
    repository::{StudentStore, UserStore},
};

impl State {
    fn student_view(&self, student: &Student) -> Student {
        Student {
            display_name: self.users.get(&student.user_id).map(User::display_name),
            ..student.clone()
        }
    }

    fn check_student_number(&self, student_number: &str, except: Option<i32>) -> AppResult<()> {
        if self
            .students
            .values()
            .any(|s| s.student_number == student_number && Some(s.id) != except)
        {
            return Err(AppError::ConstraintViolation(format!(
                "Student number {} is already in use",
                student_number
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        let mut state = self.lock().await?;
        if state.users.values().any(|u| u.email == data.email) {
            return Err(AppError::ConstraintViolation(format!(
                "Email {} is already registered",
                data.email
            )));
        }

        let now = Utc::now();
        let user = User {
            id: state.next_id("users"),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            email: data.email.clone(),
            avatar_url: data.avatar_url.clone(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i32) -> AppResult<User> {
        let state = self.lock().await?;
        state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let state = self.lock().await?;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));
        Ok(users)
    }
}

#[async_trait]
impl StudentStore for InMemoryStore {
    async fn create_student(&self, data: &CreateStudent) -> AppResult<Student> {
        let mut state = self.lock().await?;
        if !state.users.contains_key(&data.user_id) {
            return Err(AppError::NotFound(format!("User {} not found", data.user_id)));
        }
        if state.students.values().any(|s| s.user_id == data.user_id) {
            return Err(AppError::ConstraintViolation(format!(
                "User {} already has a student record",
                data.user_id
            )));
        }
        state.check_student_number(&data.student_number, None)?;

        let now = Utc::now();
        let student = Student {
            id: state.next_id("students"),
            user_id: data.user_id,
            student_number: data.student_number.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            display_name: None,
        };
        state.students.insert(student.id, student.clone());
        Ok(state.student_view(&student))
    }

    async fn get_student(&self, id: i32, include_deleted: bool) -> AppResult<Student> {
        let state = self.lock().await?;
        state
            .students
            .get(&id)
            .filter(|s| include_deleted || s.deleted_at.is_none())
            .map(|s| state.student_view(s))
            .ok_or_else(|| AppError::NotFound(format!("Student {} not found", id)))
    }

    async fn get_student_by_user(&self, user_id: i32) -> AppResult<Student> {
        let state = self.lock().await?;
        state
            .students
            .values()
            .find(|s| s.user_id == user_id && s.deleted_at.is_none())
            .map(|s| state.student_view(s))
            .ok_or_else(|| AppError::NotFound(format!("No student record for user {}", user_id)))
    }

    async fn list_students(&self, include_deleted: bool) -> AppResult<Vec<Student>> {
        let state = self.lock().await?;
        let mut students: Vec<Student> = state
            .students
            .values()
            .filter(|s| include_deleted || s.deleted_at.is_none())
            .map(|s| state.student_view(s))
            .collect();
        students.sort_by(|a, b| a.student_number.cmp(&b.student_number));
        Ok(students)
    }

    async fn update_student(&self, id: i32, data: &UpdateStudent) -> AppResult<Student> {
        let mut state = self.lock().await?;
        state.live_student(id)?;
        state.check_student_number(&data.student_number, Some(id))?;

        let student = match state.students.get_mut(&id) {
            Some(student) => {
                student.student_number = data.student_number.clone();
                student.updated_at = Utc::now();
                student.clone()
            }
            None => return Err(AppError::NotFound(format!("Student {} not found", id))),
        };
        Ok(state.student_view(&student))
    }

    async fn delete_student(&self, id: i32) -> AppResult<()> {
        let mut state = self.lock().await?;
        state.live_student(id)?;

        let active = state.active_borrows().filter(|b| b.student_id == id).count();
        if active > 0 {
            return Err(AppError::Conflict(format!(
                "Student {} still holds {} borrowed book(s)",
                id, active
            )));
        }

        if let Some(student) = state.students.get_mut(&id) {
            student.deleted_at = Some(Utc::now());
        }
        Ok(())
    }
}
