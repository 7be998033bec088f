//! Borrow/return rules shared by every store.
//!
//! `BookCopy::status` only ever changes through [`CopyTransition::apply`]; stores
//! persist the status it returns and nothing else.

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::{BookCopy, Borrow, BorrowStatus, CopyStatus},
};

/// The two status changes a copy goes through during circulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTransition {
    /// Borrow created
    CheckOut,
    /// Borrow returned
    CheckIn,
}

impl CopyTransition {
    /// Next status of `copy`, or `Conflict` when the copy is not in the expected state
    pub fn apply(self, copy: &BookCopy) -> AppResult<CopyStatus> {
        use CopyStatus::{Available, Borrowed, Damaged, Lost};

        match (self, copy.status) {
            (CopyTransition::CheckOut, Available) => Ok(Borrowed),
            (CopyTransition::CheckIn, Borrowed) => Ok(Available),
            (CopyTransition::CheckOut, current @ (Borrowed | Lost | Damaged))
            | (CopyTransition::CheckIn, current @ (Available | Lost | Damaged)) => Err(AppError::Conflict(
                format!("Copy {} is {} and cannot be {}", copy.copy_code, current, self.verb()),
            )),
        }
    }

    fn verb(self) -> &'static str {
        match self {
            CopyTransition::CheckOut => "borrowed",
            CopyTransition::CheckIn => "returned",
        }
    }
}

/// Status a newly catalogued copy may start in
pub fn initial_copy_status(requested: Option<CopyStatus>) -> AppResult<CopyStatus> {
    match requested.unwrap_or(CopyStatus::Available) {
        CopyStatus::Borrowed => Err(AppError::Validation(
            "A copy can only become borrowed through a borrow".to_string(),
        )),
        status @ (CopyStatus::Available | CopyStatus::Lost | CopyStatus::Damaged) => Ok(status),
    }
}

/// Pick the copy to lend: the available, non-deleted copy with the lowest id
pub fn select_copy(book_id: i32, candidates: &[BookCopy]) -> AppResult<&BookCopy> {
    candidates
        .iter()
        .filter(|copy| copy.book_id == book_id && copy.status == CopyStatus::Available && !copy.is_deleted())
        .min_by_key(|copy| copy.id)
        .ok_or(AppError::NoAvailableCopy(book_id))
}

pub fn check_borrow_date(date_borrowed: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if date_borrowed > today {
        return Err(AppError::InvalidDate(format!(
            "Borrow date {} is in the future",
            date_borrowed
        )));
    }
    Ok(())
}

pub fn check_return(borrow: &Borrow, date_returned: NaiveDate) -> AppResult<()> {
    if !borrow.is_active() {
        return Err(AppError::AlreadyReturned(borrow.id));
    }
    if date_returned < borrow.date_borrowed {
        return Err(AppError::InvalidDate(format!(
            "Return date {} precedes borrow date {}",
            date_returned, borrow.date_borrowed
        )));
    }
    Ok(())
}

/// The borrow as it looks once returned on `date_returned`
pub fn returned(borrow: &Borrow, date_returned: NaiveDate) -> AppResult<Borrow> {
    check_return(borrow, date_returned)?;
    Ok(Borrow {
        date_returned: Some(date_returned),
        return_status: BorrowStatus::Returned,
        ..borrow.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn copy(id: i32, book_id: i32, status: CopyStatus) -> BookCopy {
        let now = Utc::now();
        BookCopy {
            id,
            book_id,
            copy_code: format!("C{}", id),
            status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn borrow(date_borrowed: NaiveDate, date_returned: Option<NaiveDate>) -> Borrow {
        let now = Utc::now();
        Borrow {
            id: 11,
            student_id: 1,
            book_copy_id: 1,
            date_borrowed,
            date_returned,
            return_status: if date_returned.is_some() {
                BorrowStatus::Returned
            } else {
                BorrowStatus::Borrowed
            },
            created_at: now,
            updated_at: now,
            deleted_at: None,
            book_id: None,
            book_title: None,
            copy_code: None,
            student_number: None,
            student_name: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn check_out_then_check_in_restores_status() {
        let mut c = copy(1, 1, CopyStatus::Available);
        c.status = CopyTransition::CheckOut.apply(&c).unwrap();
        assert_eq!(c.status, CopyStatus::Borrowed);
        c.status = CopyTransition::CheckIn.apply(&c).unwrap();
        assert_eq!(c.status, CopyStatus::Available);
    }

    #[test]
    fn transitions_from_unexpected_states_conflict() {
        for status in [CopyStatus::Borrowed, CopyStatus::Lost, CopyStatus::Damaged] {
            assert!(matches!(
                CopyTransition::CheckOut.apply(&copy(1, 1, status)),
                Err(AppError::Conflict(_))
            ));
        }
        for status in [CopyStatus::Available, CopyStatus::Lost, CopyStatus::Damaged] {
            assert!(matches!(
                CopyTransition::CheckIn.apply(&copy(1, 1, status)),
                Err(AppError::Conflict(_))
            ));
        }
    }

    #[test]
    fn select_copy_prefers_lowest_available_id() {
        let mut deleted = copy(1, 7, CopyStatus::Available);
        deleted.deleted_at = Some(Utc::now());
        let candidates = vec![
            copy(9, 7, CopyStatus::Available),
            deleted,
            copy(2, 7, CopyStatus::Borrowed),
            copy(4, 7, CopyStatus::Available),
            copy(3, 8, CopyStatus::Available),
        ];
        assert_eq!(select_copy(7, &candidates).unwrap().id, 4);
    }

    #[test]
    fn select_copy_without_candidates_reports_the_book() {
        let candidates = vec![copy(1, 7, CopyStatus::Borrowed), copy(2, 7, CopyStatus::Lost)];
        assert!(matches!(select_copy(7, &candidates), Err(AppError::NoAvailableCopy(7))));
        assert!(matches!(select_copy(7, &[]), Err(AppError::NoAvailableCopy(7))));
    }

    #[test]
    fn borrow_date_may_be_today_but_not_tomorrow() {
        let today = date(2024, 3, 10);
        assert!(check_borrow_date(today, today).is_ok());
        assert!(check_borrow_date(date(2024, 3, 1), today).is_ok());
        assert!(matches!(
            check_borrow_date(date(2024, 3, 11), today),
            Err(AppError::InvalidDate(_))
        ));
    }

    #[test]
    fn return_checks_order_and_idempotency() {
        let active = borrow(date(2024, 3, 10), None);
        assert!(check_return(&active, date(2024, 3, 10)).is_ok());
        assert!(matches!(
            check_return(&active, date(2024, 3, 9)),
            Err(AppError::InvalidDate(_))
        ));

        let closed = borrow(date(2024, 3, 10), Some(date(2024, 3, 12)));
        // AlreadyReturned wins over a bad date
        assert!(matches!(
            check_return(&closed, date(2024, 1, 1)),
            Err(AppError::AlreadyReturned(11))
        ));
    }

    #[test]
    fn returned_stamps_status_and_date_together() {
        let active = borrow(date(2024, 3, 10), None);
        let done = returned(&active, date(2024, 3, 20)).unwrap();
        assert_eq!(done.return_status, BorrowStatus::Returned);
        assert_eq!(done.date_returned, Some(date(2024, 3, 20)));
        assert!(!done.is_active());
    }

    #[test]
    fn initial_status_refuses_borrowed() {
        assert_eq!(initial_copy_status(None).unwrap(), CopyStatus::Available);
        assert_eq!(initial_copy_status(Some(CopyStatus::Damaged)).unwrap(), CopyStatus::Damaged);
        assert!(matches!(
            initial_copy_status(Some(CopyStatus::Borrowed)),
            Err(AppError::Validation(_))
        ));
    }
}
