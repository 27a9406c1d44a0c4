use chrono::NaiveDate;
use company_core::db::open_db_in_memory;
use company_core::{
    AssignmentDraft, CompanySession, Employee, EmployeeDraft, EntityKind, ServiceError, Sex,
};
use rusqlite::Connection;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn draft(first: &str, last: &str) -> EmployeeDraft {
    EmployeeDraft {
        first_name: first.to_string(),
        last_name: last.to_string(),
        address: "221B Baker Street, London, UK".to_string(),
        birth_date: date(1985, 5, 5),
        sex: Sex::Male,
        position: "Engineer".to_string(),
        dept_no: None,
    }
}

fn add(session: &CompanySession<'_>, draft: EmployeeDraft) -> Employee {
    session.employees.add_employee(&draft).unwrap()
}

fn ids(employees: &[Employee]) -> Vec<i64> {
    employees.iter().map(|employee| employee.emp_no).collect()
}

fn employee_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn add_employee_roundtrip_preserves_fields() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();

    let input = EmployeeDraft {
        sex: Sex::Female,
        birth_date: date(1992, 2, 29),
        ..draft("Ada", "Lovelace")
    };
    let created = add(&session, input.clone());

    let loaded = session.employees.get_by_id(created.emp_no).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.birth_date, input.birth_date);
    assert_eq!(loaded.sex, Sex::Female);
    assert_eq!(
        (loaded.first_name.as_str(), loaded.last_name.as_str()),
        ("Ada", "Lovelace")
    );
}

#[test]
fn add_employee_rejects_unknown_department() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();

    let err = session
        .employees
        .add_employee(&EmployeeDraft {
            dept_no: Some(12),
            ..draft("Ada", "Lovelace")
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::ReferentialIntegrity(_)));
    assert_eq!(employee_count(&conn), 0);
}

#[test]
fn add_employee_rejects_duplicate_name_pair() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    add(&session, draft("Ada", "Lovelace"));

    let err = session
        .employees
        .add_employee(&draft("Ada", "Lovelace"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Uniqueness(_)));

    add(&session, draft("Ada", "Byron"));
    assert_eq!(employee_count(&conn), 2);
}

#[test]
fn update_employee_replaces_fields_and_allows_own_name() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    let head = add(&session, draft("Grace", "Hopper"));
    let department = session.departments.add_department("IT", head.emp_no).unwrap();
    let employee = add(&session, draft("Ada", "Lovelace"));

    let updated = session
        .employees
        .update_employee(
            employee.emp_no,
            &EmployeeDraft {
                address: "Rio de Janeiro, Brazil".to_string(),
                dept_no: Some(department.dept_no),
                ..draft("Ada", "Lovelace")
            },
        )
        .unwrap();

    assert_eq!(updated.emp_no, employee.emp_no);
    assert_eq!(updated.address, "Rio de Janeiro, Brazil");
    assert_eq!(updated.dept_no, Some(department.dept_no));
    assert_eq!(
        session.employees.get_by_id(employee.emp_no).unwrap(),
        Some(updated)
    );
}

#[test]
fn update_employee_rejects_name_pair_of_someone_else() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    let ada = add(&session, draft("Ada", "Lovelace"));
    let department = session.departments.add_department("IT", ada.emp_no).unwrap();
    let other = add(&session, draft("Alan", "Turing"));

    let err = session
        .employees
        .update_employee(
            other.emp_no,
            &EmployeeDraft {
                dept_no: Some(department.dept_no),
                ..draft("Ada", "Lovelace")
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Uniqueness(_)));
}

#[test]
fn update_employee_blocks_manager_position_for_sitting_head() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    let head = add(&session, draft("Grace", "Hopper"));
    let department = session.departments.add_department("IT", head.emp_no).unwrap();

    let err = session
        .employees
        .update_employee(
            head.emp_no,
            &EmployeeDraft {
                position: " manager ".to_string(),
                dept_no: Some(department.dept_no),
                ..draft("Grace", "Hopper")
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::BusinessRule(_)));

    let unchanged = session.employees.get_by_id(head.emp_no).unwrap().unwrap();
    assert_eq!(unchanged.position, "Engineer");

    // Someone who heads nothing may take the title.
    let clerk = add(&session, draft("Alan", "Turing"));
    let promoted = session
        .employees
        .update_employee(
            clerk.emp_no,
            &EmployeeDraft {
                position: "Manager".to_string(),
                dept_no: Some(department.dept_no),
                ..draft("Alan", "Turing")
            },
        )
        .unwrap();
    assert_eq!(promoted.position, "Manager");
}

#[test]
fn update_missing_employee_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    let head = add(&session, draft("Grace", "Hopper"));
    let department = session.departments.add_department("IT", head.emp_no).unwrap();

    let err = session
        .employees
        .update_employee(
            41,
            &EmployeeDraft {
                dept_no: Some(department.dept_no),
                ..draft("Ada", "Lovelace")
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: EntityKind::Employee,
            id: 41
        }
    ));
    assert_eq!(employee_count(&conn), 1);
}

#[test]
fn update_employee_requires_a_department() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    // Creating without a home department is allowed.
    let employee = add(&session, draft("Ada", "Lovelace"));

    let err = session
        .employees
        .update_employee(
            employee.emp_no,
            &EmployeeDraft {
                address: "Rio de Janeiro, Brazil".to_string(),
                ..draft("Ada", "Lovelace")
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::ReferentialIntegrity(_)));
    assert_eq!(
        session.employees.get_by_id(employee.emp_no).unwrap(),
        Some(employee.clone())
    );

    let err = session
        .employees
        .update_employee(
            employee.emp_no,
            &EmployeeDraft {
                dept_no: Some(7),
                ..draft("Ada", "Lovelace")
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::ReferentialIntegrity(_)));
}

#[test]
fn delete_employee_restricts_heads_and_booked_employees() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    let head = add(&session, draft("Grace", "Hopper"));
    let department = session.departments.add_department("IT", head.emp_no).unwrap();
    let project = session.projects.add_project("Compiler", department.dept_no).unwrap();
    let worker = add(&session, draft("Ada", "Lovelace"));
    session
        .assignments
        .add_assignment(&AssignmentDraft {
            emp_no: worker.emp_no,
            proj_no: project.proj_no,
            date_worked: date(2024, 3, 1),
            hours_worked: 4.0,
        })
        .unwrap();
    let free = add(&session, draft("Alan", "Turing"));

    for emp_no in [head.emp_no, worker.emp_no] {
        let err = session.employees.delete_employee(emp_no).unwrap_err();
        assert!(matches!(err, ServiceError::ReferentialIntegrity(_)));
    }
    session.employees.delete_employee(free.emp_no).unwrap();

    assert_eq!(employee_count(&conn), 2);
    assert_eq!(session.employees.get_by_id(free.emp_no).unwrap(), None);
}

#[test]
fn delete_missing_employee_returns_not_found_without_changes() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    add(&session, draft("Ada", "Lovelace"));

    let err = session.employees.delete_employee(500).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: EntityKind::Employee,
            id: 500
        }
    ));
    assert_eq!(employee_count(&conn), 1);
}

#[test]
fn born_in_range_includes_both_boundaries() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    let born = |first: &str, birth_date| EmployeeDraft {
        birth_date,
        ..draft(first, "Range")
    };
    add(&session, born("Before", date(1979, 12, 31)));
    let start = add(&session, born("Start", date(1980, 1, 1)));
    let middle = add(&session, born("Middle", date(1985, 7, 15)));
    let end = add(&session, born("End", date(1990, 1, 1)));
    add(&session, born("After", date(1990, 1, 2)));

    let in_range = session.employees.get_employees_born_in_range(1).unwrap();
    assert_eq!(ids(&in_range), vec![start.emp_no, middle.emp_no, end.emp_no]);
}

#[test]
fn female_employees_after_excludes_boundary_and_men() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    add(
        &session,
        EmployeeDraft {
            sex: Sex::Female,
            birth_date: date(1990, 1, 1),
            ..draft("Boundary", "Case")
        },
    );
    add(
        &session,
        EmployeeDraft {
            birth_date: date(1995, 1, 1),
            ..draft("Young", "Man")
        },
    );
    let young = add(
        &session,
        EmployeeDraft {
            sex: Sex::Female,
            birth_date: date(1990, 1, 2),
            ..draft("Young", "Woman")
        },
    );

    let found = session.employees.get_female_employees_after(1).unwrap();
    assert_eq!(ids(&found), vec![young.emp_no]);
}

#[test]
fn non_manager_employees_exclude_department_heads() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    let first = add(&session, draft("First", "Employee"));
    let second = add(&session, draft("Second", "Employee"));
    let third = add(&session, draft("Third", "Employee"));
    session.departments.add_department("IT", second.emp_no).unwrap();

    let found = session.employees.get_non_manager_employees(1).unwrap();
    assert_eq!(ids(&found), vec![first.emp_no, third.emp_no]);
}

#[test]
fn country_set_matches_case_insensitively_sorted_by_last_name() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    let lives_in = |first: &str, last: &str, address: &str| EmployeeDraft {
        address: address.to_string(),
        ..draft(first, last)
    };
    let zhang = add(&session, lives_in("Wei", "Zhang", "12 Nanjing Road, Shanghai, CHINA"));
    let silva = add(&session, lives_in("Ana", "Silva", "Av. Paulista 1000, Sao Paulo, brazil"));
    add(&session, lives_in("John", "Smith", "1 Infinite Loop, Cupertino, USA"));
    let naidoo = add(&session, lives_in("Thabo", "Naidoo", "Cape Town, South Africa"));
    let ivanov = add(&session, lives_in("Ivan", "Ivanov", "Moscow, Russia"));

    let found = session.employees.get_employees_in_country_set(1).unwrap();
    assert_eq!(
        ids(&found),
        vec![ivanov.emp_no, naidoo.emp_no, silva.emp_no, zhang.emp_no]
    );
}

#[test]
fn department_membership_uses_exact_department_name() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    let it_head = add(&session, draft("Grace", "Hopper"));
    let hr_head = add(&session, draft("Alan", "Turing"));
    let it = session.departments.add_department("IT", it_head.emp_no).unwrap();
    let hr = session.departments.add_department("HR", hr_head.emp_no).unwrap();
    let in_it = add(
        &session,
        EmployeeDraft {
            dept_no: Some(it.dept_no),
            ..draft("Ada", "Lovelace")
        },
    );
    add(
        &session,
        EmployeeDraft {
            dept_no: Some(hr.dept_no),
            ..draft("Linus", "Torvalds")
        },
    );

    let found = session
        .employees
        .get_employees_in_department_named(1, "IT")
        .unwrap();
    assert_eq!(ids(&found), vec![in_it.emp_no]);
    assert!(session
        .employees
        .get_employees_in_department_named(1, "it")
        .unwrap()
        .is_empty());
}

#[test]
fn list_page_treats_low_pages_as_first_and_ends_empty() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    for index in 0..15 {
        add(&session, draft(&format!("Person{index:02}"), "Paged"));
    }

    let first = session.employees.list_page(1).unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(session.employees.list_page(0).unwrap(), first);
    assert_eq!(session.employees.list_page(i64::MIN).unwrap(), first);

    let second = session.employees.list_page(2).unwrap();
    assert_eq!(second.len(), 5);
    assert!(ids(&first).iter().all(|id| !ids(&second).contains(id)));
    assert!(session.employees.list_page(3).unwrap().is_empty());
    assert!(session.employees.list_page(i64::MAX).unwrap().is_empty());
}

#[test]
fn employee_serializes_with_iso_birth_date() {
    let conn = open_db_in_memory().unwrap();
    let session = CompanySession::try_new(&conn).unwrap();
    let employee = add(&session, draft("Ada", "Lovelace"));

    let value = serde_json::to_value(&employee).unwrap();
    assert_eq!(value["birth_date"], "1985-05-05");
    assert_eq!(value["sex"], "Male");
    assert_eq!(value["dept_no"], serde_json::Value::Null);
}
