//! Employee repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over the `employees` table.
//! - Filtered, ordered, paginated employee listing shared with the
//!   department repository (department heads are employees).
//!
//! # Invariants
//! - Listing order is total: every order ends with `emp_no ASC`.
//! - Address matching is case-insensitive substring matching.

use super::schema::ensure_schema_ready;
use super::{PageWindow, RepoError, RepoResult};
use crate::model::department::DeptNo;
use crate::model::employee::{EmpNo, Employee, EmployeeDraft, Sex};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    emp_no,
    first_name,
    last_name,
    address,
    birth_date,
    sex,
    position,
    dept_no
FROM employees";

/// Row filter for employee listings. Every set field narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub sex: Option<Sex>,
    /// Inclusive lower bound on `birth_date`.
    pub born_on_or_after: Option<NaiveDate>,
    /// Inclusive upper bound on `birth_date`.
    pub born_on_or_before: Option<NaiveDate>,
    /// Exclusive lower bound on `birth_date`.
    pub born_after: Option<NaiveDate>,
    /// `Some(true)`: heads a department. `Some(false)`: heads none.
    pub heads_department: Option<bool>,
    /// Keeps employees whose address contains any of these fragments,
    /// ignoring case. Empty means no address filter.
    pub address_contains_any: Vec<String>,
    /// Exact name of the employee's home department.
    pub department_name: Option<String>,
}

/// Sort order for employee listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmployeeOrder {
    #[default]
    EmpNo,
    LastName,
    LastNameFirstName,
}

/// Query options for employee listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeListQuery {
    pub filter: EmployeeFilter,
    pub order: EmployeeOrder,
    pub page: PageWindow,
}

/// Repository interface for employee persistence.
pub trait EmployeeRepository {
    /// Inserts a new employee and returns it with its generated key.
    fn create_employee(&self, draft: &EmployeeDraft) -> RepoResult<Employee>;
    /// Replaces every mutable field. `None` when the row does not exist.
    fn replace_employee(&self, emp_no: EmpNo, draft: &EmployeeDraft)
        -> RepoResult<Option<Employee>>;
    /// Removes one row. `false` when the row does not exist.
    fn delete_employee(&self, emp_no: EmpNo) -> RepoResult<bool>;
    fn get_employee(&self, emp_no: EmpNo) -> RepoResult<Option<Employee>>;
    fn list_employees(&self, query: &EmployeeListQuery) -> RepoResult<Vec<Employee>>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["employees", "departments"])?;
        Ok(Self { conn })
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_employee(&self, draft: &EmployeeDraft) -> RepoResult<Employee> {
        self.conn.execute(
            "INSERT INTO employees (
                first_name,
                last_name,
                address,
                birth_date,
                sex,
                position,
                dept_no
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                draft.first_name.as_str(),
                draft.last_name.as_str(),
                draft.address.as_str(),
                draft.birth_date,
                draft.sex.as_str(),
                draft.position.as_str(),
                draft.dept_no,
            ],
        )?;

        Ok(draft.clone().into_employee(self.conn.last_insert_rowid()))
    }

    fn replace_employee(
        &self,
        emp_no: EmpNo,
        draft: &EmployeeDraft,
    ) -> RepoResult<Option<Employee>> {
        let changed = self.conn.execute(
            "UPDATE employees
             SET
                first_name = ?2,
                last_name = ?3,
                address = ?4,
                birth_date = ?5,
                sex = ?6,
                position = ?7,
                dept_no = ?8
             WHERE emp_no = ?1;",
            params![
                emp_no,
                draft.first_name.as_str(),
                draft.last_name.as_str(),
                draft.address.as_str(),
                draft.birth_date,
                draft.sex.as_str(),
                draft.position.as_str(),
                draft.dept_no,
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        Ok(Some(draft.clone().into_employee(emp_no)))
    }

    fn delete_employee(&self, emp_no: EmpNo) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM employees WHERE emp_no = ?1;", [emp_no])?;
        Ok(changed > 0)
    }

    fn get_employee(&self, emp_no: EmpNo) -> RepoResult<Option<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE emp_no = ?1;"))?;
        let row = stmt
            .query_row([emp_no], |row| Ok(parse_employee_row(row)))
            .optional()?;
        row.transpose()
    }

    fn list_employees(&self, query: &EmployeeListQuery) -> RepoResult<Vec<Employee>> {
        query_employees(self.conn, query)
    }
}

/// Runs a filtered employee listing on any connection.
pub(crate) fn query_employees(
    conn: &Connection,
    query: &EmployeeListQuery,
) -> RepoResult<Vec<Employee>> {
    let (where_sql, mut bind_values) = build_filter(&query.filter);
    let order_sql = match query.order {
        EmployeeOrder::EmpNo => "emp_no ASC",
        EmployeeOrder::LastName => "last_name ASC, emp_no ASC",
        EmployeeOrder::LastNameFirstName => "last_name ASC, first_name ASC, emp_no ASC",
    };
    let sql = format!("{EMPLOYEE_SELECT_SQL}{where_sql} ORDER BY {order_sql} LIMIT ? OFFSET ?");
    bind_values.push(Value::Integer(query.page.limit));
    bind_values.push(Value::Integer(query.page.offset));

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut employees = Vec::new();
    while let Some(row) = rows.next()? {
        employees.push(parse_employee_row(row)?);
    }
    Ok(employees)
}

pub(crate) fn count_matching_employees(
    conn: &Connection,
    filter: &EmployeeFilter,
) -> RepoResult<i64> {
    let (where_sql, bind_values) = build_filter(filter);
    let sql = format!("SELECT COUNT(*) FROM employees{where_sql};");
    let count = conn.query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
    Ok(count)
}

fn build_filter(filter: &EmployeeFilter) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(sex) = filter.sex {
        sql.push_str(" AND sex = ?");
        bind_values.push(Value::Text(sex.as_str().to_string()));
    }
    if let Some(date) = filter.born_on_or_after {
        sql.push_str(" AND birth_date >= ?");
        bind_values.push(date_value(date));
    }
    if let Some(date) = filter.born_on_or_before {
        sql.push_str(" AND birth_date <= ?");
        bind_values.push(date_value(date));
    }
    if let Some(date) = filter.born_after {
        sql.push_str(" AND birth_date > ?");
        bind_values.push(date_value(date));
    }
    match filter.heads_department {
        Some(true) => sql.push_str(
            " AND EXISTS (
                SELECT 1 FROM departments d WHERE d.manager_emp_no = employees.emp_no
            )",
        ),
        Some(false) => sql.push_str(
            " AND NOT EXISTS (
                SELECT 1 FROM departments d WHERE d.manager_emp_no = employees.emp_no
            )",
        ),
        None => {}
    }
    if !filter.address_contains_any.is_empty() {
        let clauses = vec!["instr(lower(address), ?) > 0"; filter.address_contains_any.len()];
        sql.push_str(&format!(" AND ({})", clauses.join(" OR ")));
        for fragment in &filter.address_contains_any {
            bind_values.push(Value::Text(fragment.to_lowercase()));
        }
    }
    if let Some(name) = filter.department_name.as_ref() {
        sql.push_str(
            " AND EXISTS (
                SELECT 1 FROM departments d
                WHERE d.dept_no = employees.dept_no AND d.name = ?
            )",
        );
        bind_values.push(Value::Text(name.clone()));
    }

    (sql, bind_values)
}

// Matches the `%F` text form rusqlite writes for `NaiveDate` parameters.
fn date_value(date: NaiveDate) -> Value {
    Value::Text(date.format("%F").to_string())
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let sex_text: String = row.get("sex")?;
    let sex = Sex::parse(&sex_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid sex `{sex_text}` in employees.sex"))
    })?;

    Ok(Employee {
        emp_no: row.get("emp_no")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        address: row.get("address")?,
        birth_date: row.get("birth_date")?,
        sex,
        position: row.get("position")?,
        dept_no: row.get::<_, Option<DeptNo>>("dept_no")?,
    })
}
