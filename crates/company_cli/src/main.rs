//! Report runner over a company records database.
//!
//! # Responsibility
//! - Start from the `COMPANY_*` environment (`CoreConfig::from_env`) and let
//!   flags override it.
//! - Run one listing or report page and print it as JSON on stdout.

use clap::{Args, Parser, Subcommand};
use company_core::config::ENV_DB_PATH;
use company_core::{CompanySession, CoreConfig, DatabaseLocation, DEFAULT_PROJECT_DEPARTMENTS};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "company", version, about = "Query company records")]
struct Cli {
    /// SQLite database file; overrides COMPANY_DB_PATH
    #[arg(long = "db", global = true)]
    db: Option<PathBuf>,

    /// trace | debug | info | warn | error; overrides COMPANY_LOG_LEVEL
    #[arg(long = "log-level", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; overrides COMPANY_LOG_DIR
    #[arg(long = "log-dir", global = true)]
    log_dir: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long = "pretty", global = true)]
    pretty: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Args)]
struct PageArgs {
    /// 1-based page number; values below 1 read the first page
    #[arg(long = "page", default_value_t = 1, allow_negative_numbers = true)]
    page: i64,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List employees by id
    Employees(PageArgs),
    /// List departments by id
    Departments(PageArgs),
    /// List projects by id
    Projects(PageArgs),
    /// List works-on assignments by id
    Assignments(PageArgs),
    /// Female department heads, by last then first name
    FemaleManagers(PageArgs),
    /// Number of female department heads
    FemaleManagerCount,
    /// Department heads reported as under forty
    ManagersUnderForty(PageArgs),
    /// Departments with more than ten employees
    LargeDepartments(PageArgs),
    /// Employees born 1980-01-01 through 1990-01-01
    BornInRange(PageArgs),
    /// Female employees born after 1990-01-01
    YoungFemaleEmployees(PageArgs),
    /// Employees heading no department
    NonManagers(PageArgs),
    /// Employees living in a BRICS country
    BricsEmployees(PageArgs),
    /// Employees whose home department has the given name
    DepartmentMembers {
        #[arg(long = "name")]
        name: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Projects owned by the named departments (IT and HR by default)
    ProjectsByDepartment {
        #[arg(long = "department")]
        departments: Vec<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Projects nobody has booked hours on
    UnassignedProjects(PageArgs),
    /// Total hours and project names per employee
    HoursPerEmployee(PageArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = config_from(&cli, CoreConfig::from_env())?;
    config.init_logging()?;
    let conn = config.open_database()?;
    let session = CompanySession::try_new(&conn)?;
    info!("event=cli_command module=cli status=start");

    let pretty = cli.pretty;
    match cli.cmd {
        Command::Employees(args) => print_json(&session.employees.list_page(args.page)?, pretty),
        Command::Departments(args) => {
            print_json(&session.departments.list_page(args.page)?, pretty)
        }
        Command::Projects(args) => print_json(&session.projects.list_page(args.page)?, pretty),
        Command::Assignments(args) => {
            print_json(&session.assignments.list_page(args.page)?, pretty)
        }
        Command::FemaleManagers(args) => print_json(
            &session.departments.get_female_managers(args.page)?,
            pretty,
        ),
        Command::FemaleManagerCount => {
            print_json(&session.departments.count_female_managers()?, pretty)
        }
        Command::ManagersUnderForty(args) => print_json(
            &session.departments.get_managers_under_forty(args.page)?,
            pretty,
        ),
        Command::LargeDepartments(args) => print_json(
            &session
                .departments
                .get_departments_over_ten_employees(args.page)?,
            pretty,
        ),
        Command::BornInRange(args) => print_json(
            &session.employees.get_employees_born_in_range(args.page)?,
            pretty,
        ),
        Command::YoungFemaleEmployees(args) => print_json(
            &session.employees.get_female_employees_after(args.page)?,
            pretty,
        ),
        Command::NonManagers(args) => print_json(
            &session.employees.get_non_manager_employees(args.page)?,
            pretty,
        ),
        Command::BricsEmployees(args) => print_json(
            &session.employees.get_employees_in_country_set(args.page)?,
            pretty,
        ),
        Command::DepartmentMembers { name, page } => print_json(
            &session
                .employees
                .get_employees_in_department_named(page.page, &name)?,
            pretty,
        ),
        Command::ProjectsByDepartment { departments, page } => {
            let names: Vec<&str> = if departments.is_empty() {
                DEFAULT_PROJECT_DEPARTMENTS.to_vec()
            } else {
                departments.iter().map(String::as_str).collect()
            };
            print_json(
                &session
                    .projects
                    .get_projects_by_department_names(page.page, &names)?,
                pretty,
            )
        }
        Command::UnassignedProjects(args) => print_json(
            &session.projects.get_projects_with_no_assignments(args.page)?,
            pretty,
        ),
        Command::HoursPerEmployee(args) => print_json(
            &session.assignments.get_total_hours_per_employee(args.page)?,
            pretty,
        ),
    }
}

/// Applies flags on top of `base`. Reports read a stored database, so a
/// configuration still pointing at the in-memory default is refused.
fn config_from(cli: &Cli, base: CoreConfig) -> Result<CoreConfig, Box<dyn Error>> {
    let mut config = base;
    if let Some(path) = cli.db.as_ref() {
        config.database = DatabaseLocation::File(path.clone());
    }
    if let Some(level) = cli.log_level.as_ref().filter(|level| !level.trim().is_empty()) {
        config.log_level = level.clone();
    }
    if let Some(dir) = cli.log_dir.as_ref() {
        config.log_dir = Some(dir.clone());
    }
    if config.database == DatabaseLocation::Memory {
        return Err(format!("no database configured; pass --db or set {ENV_DB_PATH}").into());
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{config_from, Cli, Command};
    use clap::Parser;
    use company_core::{CoreConfig, DatabaseLocation};
    use std::path::PathBuf;

    #[test]
    fn page_flag_accepts_negative_numbers() {
        let cli = Cli::try_parse_from(["company", "employees", "--page", "-3"]).unwrap();
        assert!(matches!(cli.cmd, Command::Employees(args) if args.page == -3));
    }

    #[test]
    fn db_flag_selects_file_store() {
        let cli = Cli::try_parse_from([
            "company",
            "--db",
            "/tmp/company.sqlite3",
            "hours-per-employee",
        ])
        .unwrap();
        let base = CoreConfig {
            database: DatabaseLocation::File(PathBuf::from("/srv/from-env.sqlite3")),
            log_level: "warn".to_string(),
            ..CoreConfig::default()
        };
        let config = config_from(&cli, base).unwrap();
        assert_eq!(
            config.database,
            DatabaseLocation::File(PathBuf::from("/tmp/company.sqlite3"))
        );
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn environment_database_is_used_without_flag() {
        let cli = Cli::try_parse_from(["company", "--log-level", "debug", "employees"]).unwrap();
        let base = CoreConfig {
            database: DatabaseLocation::File(PathBuf::from("/srv/from-env.sqlite3")),
            ..CoreConfig::default()
        };
        let config = config_from(&cli, base).unwrap();
        assert_eq!(
            config.database,
            DatabaseLocation::File(PathBuf::from("/srv/from-env.sqlite3"))
        );
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn missing_database_is_an_error() {
        let cli = Cli::try_parse_from(["company", "employees"]).unwrap();
        let err = config_from(&cli, CoreConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--db"), "unexpected message: {err}");
    }

    #[test]
    fn projects_by_department_collects_repeated_flags() {
        let cli = Cli::try_parse_from([
            "company",
            "projects-by-department",
            "--department",
            "IT",
            "--department",
            "Sales",
        ])
        .unwrap();
        assert!(matches!(
            cli.cmd,
            Command::ProjectsByDepartment { departments, .. } if departments == ["IT", "Sales"]
        ));
    }
}
