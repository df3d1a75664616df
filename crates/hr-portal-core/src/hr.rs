//! Typed HR helpers used by the portal pages.

use crate::dispatcher::Dispatcher;
use crate::models::{CallResult, Record, SearchParams};
use crate::Result;
use serde_json::{json, Map, Value};

pub const EMPLOYEE: &str = "hr.employee";
pub const DEPARTMENT: &str = "hr.department";
pub const ATTENDANCE: &str = "hr.attendance";
pub const PAYSLIP: &str = "hr.payslip";
pub const USERS: &str = "res.users";

const EMPLOYEE_FIELDS: [&str; 5] = ["name", "job_title", "department_id", "work_email", "work_phone"];
const DEPARTMENT_FIELDS: [&str; 4] = ["name", "parent_id", "manager_id", "member_ids"];
const ATTENDANCE_FIELDS: [&str; 4] = ["employee_id", "check_in", "check_out", "worked_hours"];
const PAYSLIP_FIELDS: [&str; 5] = ["employee_id", "date_from", "date_to", "state", "net_wage"];
const USER_FIELDS: [&str; 3] = ["name", "login", "email"];

const ATTENDANCE_LIMIT: usize = 50;
const ATTENDANCE_ACTION: &str = "hr_attendance.hr_attendance_action_my_attendances";

/// HR view over a [`Dispatcher`].
pub struct HrApi<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> HrApi<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub async fn employees(&self) -> Result<Vec<Record>> {
        let params = SearchParams::new().with_fields(EMPLOYEE_FIELDS);
        self.dispatcher.search_read(EMPLOYEE, &params).await
    }

    pub async fn departments(&self) -> Result<Vec<Record>> {
        let params = SearchParams::new().with_fields(DEPARTMENT_FIELDS);
        self.dispatcher.search_read(DEPARTMENT, &params).await
    }

    /// Attendance entries, optionally for one employee.
    pub async fn attendance(&self, employee_id: Option<i64>) -> Result<Vec<Record>> {
        let domain = employee_id
            .map(|id| vec![json!(["employee_id", "=", id])])
            .unwrap_or_default();
        let params = SearchParams::new()
            .with_domain(domain)
            .with_fields(ATTENDANCE_FIELDS)
            .with_limit(Some(ATTENDANCE_LIMIT));
        self.dispatcher.search_read(ATTENDANCE, &params).await
    }

    pub async fn payslips(&self) -> Result<Vec<Record>> {
        let params = SearchParams::new().with_fields(PAYSLIP_FIELDS);
        self.dispatcher.search_read(PAYSLIP, &params).await
    }

    pub async fn create_employee(&self, values: Map<String, Value>) -> Result<i64> {
        self.dispatcher.create(EMPLOYEE, values).await
    }

    pub async fn update_employee(&self, employee_id: i64, values: Map<String, Value>) -> Result<bool> {
        self.dispatcher.write(EMPLOYEE, &[employee_id], values).await
    }

    pub async fn delete_employee(&self, employee_id: i64) -> Result<bool> {
        self.dispatcher.unlink(EMPLOYEE, &[employee_id]).await
    }

    pub async fn check_in(&self, employee_id: i64) -> Result<CallResult> {
        self.attendance_manual(employee_id).await
    }

    pub async fn check_out(&self, employee_id: i64) -> Result<CallResult> {
        self.attendance_manual(employee_id).await
    }

    // The ERP toggles check-in/check-out with the same action.
    async fn attendance_manual(&self, employee_id: i64) -> Result<CallResult> {
        self.dispatcher
            .call_kw(
                EMPLOYEE,
                "attendance_manual",
                vec![json!([employee_id]), json!(ATTENDANCE_ACTION)],
                Map::new(),
            )
            .await
    }

    /// The logged-in user's record, if a session exists and the user is readable.
    pub async fn current_user(&self) -> Result<Option<Record>> {
        let Some(session) = self.dispatcher.session().await else {
            return Ok(None);
        };

        let mut kwargs = Map::new();
        kwargs.insert("fields".into(), json!(USER_FIELDS));
        let result = self
            .dispatcher
            .call_kw(USERS, "read", vec![json!([session.uid])], kwargs)
            .await?;

        Ok(result.into_records().and_then(|records| records.into_iter().next()))
    }
}
