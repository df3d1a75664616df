//! HR sample data for local development.

use super::store::MockDatasetStore;
use crate::models::Record;
use serde_json::{json, Value};

fn records(values: Value) -> Vec<Record> {
    serde_json::from_value(values).unwrap_or_default()
}

/// Load the sample HR dataset into `store`, replacing those models' records.
pub fn seed_hr_dataset(store: &mut MockDatasetStore) {
    store.load(
        "hr.employee",
        records(json!([
            {"id": 1, "name": "Kim Dev", "job_title": "Senior Developer", "department_id": [1, "Engineering"], "work_email": "kim@company.com", "work_phone": "010-1234-5678"},
            {"id": 2, "name": "Lee HR", "job_title": "HR Manager", "department_id": [2, "Human Resources"], "work_email": "lee@company.com", "work_phone": "010-2345-6789"},
            {"id": 3, "name": "Park Marketing", "job_title": "Marketing Specialist", "department_id": [3, "Marketing"], "work_email": "park@company.com", "work_phone": "010-3456-7890"},
            {"id": 4, "name": "Choi Design", "job_title": "UI/UX Designer", "department_id": [1, "Engineering"], "work_email": "choi@company.com", "work_phone": "010-4567-8901"},
            {"id": 5, "name": "Jung Sales", "job_title": "Account Executive", "department_id": [4, "Sales"], "work_email": "jung@company.com", "work_phone": "010-5678-9012"}
        ])),
    );

    store.load(
        "hr.department",
        records(json!([
            {"id": 1, "name": "Engineering", "parent_id": false, "manager_id": [1, "Kim Dev"], "member_ids": [1, 4]},
            {"id": 2, "name": "Human Resources", "parent_id": false, "manager_id": [2, "Lee HR"], "member_ids": [2]},
            {"id": 3, "name": "Marketing", "parent_id": false, "manager_id": [3, "Park Marketing"], "member_ids": [3]},
            {"id": 4, "name": "Sales", "parent_id": false, "manager_id": [5, "Jung Sales"], "member_ids": [5]}
        ])),
    );

    store.load(
        "hr.attendance",
        records(json!([
            {"id": 1, "employee_id": [1, "Kim Dev"], "check_in": "2025-08-05 09:00:00", "check_out": "2025-08-05 18:00:00", "worked_hours": 8.0},
            {"id": 2, "employee_id": [2, "Lee HR"], "check_in": "2025-08-05 09:15:00", "check_out": "2025-08-05 18:30:00", "worked_hours": 8.25},
            {"id": 3, "employee_id": [3, "Park Marketing"], "check_in": "2025-08-05 08:45:00", "check_out": "2025-08-05 17:45:00", "worked_hours": 8.0},
            {"id": 4, "employee_id": [4, "Choi Design"], "check_in": "2025-08-05 09:30:00", "check_out": false, "worked_hours": 0}
        ])),
    );

    store.load(
        "hr.payslip",
        records(json!([
            {"id": 1, "employee_id": [1, "Kim Dev"], "date_from": "2025-07-01", "date_to": "2025-07-31", "state": "done", "net_wage": 4500000},
            {"id": 2, "employee_id": [2, "Lee HR"], "date_from": "2025-07-01", "date_to": "2025-07-31", "state": "done", "net_wage": 4200000},
            {"id": 3, "employee_id": [3, "Park Marketing"], "date_from": "2025-07-01", "date_to": "2025-07-31", "state": "draft", "net_wage": 3800000}
        ])),
    );

    store.load(
        "hr.leave",
        records(json!([
            {"id": 1, "employee_id": [1, "Kim Dev"], "holiday_status_id": [1, "Annual Leave"], "date_from": "2025-08-10", "date_to": "2025-08-12", "state": "confirm", "number_of_days": 3},
            {"id": 2, "employee_id": [2, "Lee HR"], "holiday_status_id": [2, "Sick Leave"], "date_from": "2025-08-15", "date_to": "2025-08-15", "state": "validate", "number_of_days": 1}
        ])),
    );

    store.load(
        "approval.request",
        records(json!([
            {"id": 1, "name": "Business trip request", "employee_id": [1, "Kim Dev"], "category_id": [1, "Business Trip"], "state": "pending", "date": "2025-08-05"},
            {"id": 2, "name": "Equipment purchase", "employee_id": [4, "Choi Design"], "category_id": [2, "Purchase"], "state": "approved", "date": "2025-08-04"}
        ])),
    );

    store.load(
        "slide.channel",
        records(json!([
            {"id": 1, "name": "Advanced React", "description": "In-depth React course", "state": "published", "duration": 40},
            {"id": 2, "name": "Python Basics", "description": "Introduction to Python programming", "state": "published", "duration": 30},
            {"id": 3, "name": "Project Management", "description": "Practical project management methods", "state": "published", "duration": 20}
        ])),
    );

    store.load(
        "hr.appraisal",
        records(json!([
            {"id": 1, "employee_id": [1, "Kim Dev"], "name": "2025 H1 Review", "state": "new", "date_close": "2025-08-31"},
            {"id": 2, "employee_id": [2, "Lee HR"], "name": "2025 H1 Review", "state": "pending", "date_close": "2025-08-31"}
        ])),
    );

    store.load(
        "res.users",
        records(json!([
            {"id": 1, "name": "Administrator", "login": "admin", "email": "admin@example.com"}
        ])),
    );
}
