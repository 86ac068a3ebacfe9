use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_xlsxwriter::XlsxError;
use std::collections::BTreeMap;

use crate::model::employee::Department;
use crate::model::payroll::PayrollWithEmployee;
use crate::model::report::ReportType;
use crate::report::table::{Cell, Column, SheetBuilder};

pub fn department_label(department: &Option<Department>) -> &'static str {
    match department {
        Some(d) => d.label(),
        None => "Unassigned",
    }
}

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Per-employee rollup of every payroll in range.
#[derive(Debug)]
pub struct EmployeeTotals {
    pub employee_id: u64,
    pub name: String,
    pub department: Option<Department>,
    pub payroll_count: u32,
    pub gross: Decimal,
    pub allowances: Decimal,
    pub deductions: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
    tax_rates: Vec<Decimal>,
}

impl EmployeeTotals {
    /// The employee's tax rate when it is constant across their records in
    /// range; `None` means it varies.
    pub fn effective_tax_rate(&self) -> Option<Decimal> {
        match self.tax_rates.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }
}

/// Per-department rollup, with the per-employee rows it was built from.
#[derive(Debug)]
pub struct DepartmentTotals {
    pub department: Option<Department>,
    pub employees: Vec<EmployeeTotals>,
    pub gross: Decimal,
    pub net: Decimal,
}

impl DepartmentTotals {
    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }
}

pub fn totals_by_employee(rows: &[PayrollWithEmployee]) -> Vec<EmployeeTotals> {
    let mut map: BTreeMap<u64, EmployeeTotals> = BTreeMap::new();

    for row in rows {
        let entry = map.entry(row.employee_id).or_insert_with(|| EmployeeTotals {
            employee_id: row.employee_id,
            name: row.employee_name(),
            department: row.department,
            payroll_count: 0,
            gross: Decimal::ZERO,
            allowances: Decimal::ZERO,
            deductions: Decimal::ZERO,
            tax: Decimal::ZERO,
            net: Decimal::ZERO,
            tax_rates: Vec::new(),
        });

        entry.payroll_count += 1;
        entry.gross += row.gross_salary;
        entry.allowances += row.total_allowances;
        entry.deductions += row.total_deductions;
        entry.tax += row.tax_amount;
        entry.net += row.net_salary;
        if !entry.tax_rates.contains(&row.tax_rate) {
            entry.tax_rates.push(row.tax_rate);
        }
    }

    map.into_values().collect()
}

pub fn totals_by_department(rows: &[PayrollWithEmployee]) -> Vec<DepartmentTotals> {
    let mut employees_by_dept: BTreeMap<Option<Department>, Vec<EmployeeTotals>> = BTreeMap::new();
    for employee in totals_by_employee(rows) {
        employees_by_dept
            .entry(employee.department)
            .or_default()
            .push(employee);
    }

    employees_by_dept
        .into_iter()
        .map(|(department, employees)| {
            let gross = employees.iter().map(|e| e.gross).sum();
            let net = employees.iter().map(|e| e.net).sum();
            DepartmentTotals {
                department,
                employees,
                gross,
                net,
            }
        })
        .collect()
}

struct GrandTotals {
    gross: Decimal,
    allowances: Decimal,
    deductions: Decimal,
    tax: Decimal,
    net: Decimal,
}

fn grand_totals(rows: &[PayrollWithEmployee]) -> GrandTotals {
    GrandTotals {
        gross: rows.iter().map(|r| r.gross_salary).sum(),
        allowances: rows.iter().map(|r| r.total_allowances).sum(),
        deductions: rows.iter().map(|r| r.total_deductions).sum(),
        tax: rows.iter().map(|r| r.tax_amount).sum(),
        net: rows.iter().map(|r| r.net_salary).sum(),
    }
}

/// Payroll detail: one row per payroll record plus a bold grand-total row.
pub fn build_payroll_report(
    rows: &[PayrollWithEmployee],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<u8>, XlsxError> {
    const COLUMNS: &[Column] = &[
        Column::wide("Employee ID", 12.0),
        Column::wide("Employee Name", 24.0),
        Column::new("Department"),
        Column::new("Gross Salary"),
        Column::new("Allowances"),
        Column::new("Deductions"),
        Column::new("Tax"),
        Column::new("Net Salary"),
        Column::new("Pay Period"),
    ];

    let mut sheet = SheetBuilder::new(ReportType::Payroll.title(), COLUMNS.len() as u16)?;
    sheet.period_banner(start, end)?;
    sheet.headers(COLUMNS)?;

    for row in rows {
        sheet.data_row(&[
            Cell::Int(row.employee_id as i64),
            Cell::Text(row.employee_name()),
            Cell::Text(department_label(&row.department).to_string()),
            Cell::Money(row.gross_salary),
            Cell::Money(row.total_allowances),
            Cell::Money(row.total_deductions),
            Cell::Money(row.tax_amount),
            Cell::Money(row.net_salary),
            Cell::Date(row.pay_period),
        ])?;
    }

    let totals = grand_totals(rows);
    sheet.total_row(&[
        Cell::Empty,
        Cell::Text("Total".to_string()),
        Cell::Empty,
        Cell::Money(totals.gross),
        Cell::Money(totals.allowances),
        Cell::Money(totals.deductions),
        Cell::Money(totals.tax),
        Cell::Money(totals.net),
        Cell::Empty,
    ])?;

    sheet.finish()
}

/// Department summary: one sub-table per department (employee rows plus a
/// subtotal), and a grand-total table across departments when no single
/// department filter was applied.
pub fn build_department_report(
    rows: &[PayrollWithEmployee],
    start: NaiveDate,
    end: NaiveDate,
    single_department: bool,
) -> Result<Vec<u8>, XlsxError> {
    const COLUMNS: &[Column] = &[
        Column::wide("Employee", 24.0),
        Column::new("Payrolls"),
        Column::new("Gross Salary"),
        Column::new("Allowances"),
        Column::new("Deductions"),
        Column::new("Tax"),
        Column::new("Net Salary"),
    ];

    let mut sheet = SheetBuilder::new(ReportType::Department.title(), COLUMNS.len() as u16)?;
    sheet.period_banner(start, end)?;

    let departments = totals_by_department(rows);

    for dept in &departments {
        sheet.blank_row();
        sheet.section_title(department_label(&dept.department))?;
        sheet.headers(COLUMNS)?;

        for employee in &dept.employees {
            sheet.data_row(&[
                Cell::Text(employee.name.clone()),
                Cell::Int(employee.payroll_count as i64),
                Cell::Money(employee.gross),
                Cell::Money(employee.allowances),
                Cell::Money(employee.deductions),
                Cell::Money(employee.tax),
                Cell::Money(employee.net),
            ])?;
        }

        sheet.total_row(&[
            Cell::Text("Subtotal".to_string()),
            Cell::Int(dept.employee_count() as i64),
            Cell::Money(dept.gross),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Money(dept.net),
        ])?;
    }

    if !single_department {
        sheet.blank_row();
        sheet.section_title("All Departments")?;
        sheet.headers(&[
            Column::new("Department"),
            Column::new("Employees"),
            Column::new("Total Gross"),
            Column::new("Total Net"),
        ])?;

        for dept in &departments {
            sheet.data_row(&[
                Cell::Text(department_label(&dept.department).to_string()),
                Cell::Int(dept.employee_count() as i64),
                Cell::Money(dept.gross),
                Cell::Money(dept.net),
            ])?;
        }

        let totals = grand_totals(rows);
        sheet.total_row(&[
            Cell::Text("Grand Total".to_string()),
            Cell::Empty,
            Cell::Money(totals.gross),
            Cell::Money(totals.net),
        ])?;
    }

    sheet.finish()
}

/// Employee summary: one row per employee aggregated over the range.
pub fn build_employee_report(
    rows: &[PayrollWithEmployee],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<u8>, XlsxError> {
    const COLUMNS: &[Column] = &[
        Column::wide("Employee ID", 12.0),
        Column::wide("Employee Name", 24.0),
        Column::new("Department"),
        Column::new("Payrolls"),
        Column::new("Total Gross"),
        Column::new("Total Allowances"),
        Column::new("Total Deductions"),
        Column::new("Total Tax"),
        Column::new("Total Net"),
    ];

    let mut sheet = SheetBuilder::new(ReportType::Employee.title(), COLUMNS.len() as u16)?;
    sheet.period_banner(start, end)?;
    sheet.headers(COLUMNS)?;

    let employees = totals_by_employee(rows);
    for employee in &employees {
        sheet.data_row(&[
            Cell::Int(employee.employee_id as i64),
            Cell::Text(employee.name.clone()),
            Cell::Text(department_label(&employee.department).to_string()),
            Cell::Int(employee.payroll_count as i64),
            Cell::Money(employee.gross),
            Cell::Money(employee.allowances),
            Cell::Money(employee.deductions),
            Cell::Money(employee.tax),
            Cell::Money(employee.net),
        ])?;
    }

    let totals = grand_totals(rows);
    sheet.total_row(&[
        Cell::Empty,
        Cell::Text("Total".to_string()),
        Cell::Empty,
        Cell::Int(rows.len() as i64),
        Cell::Money(totals.gross),
        Cell::Money(totals.allowances),
        Cell::Money(totals.deductions),
        Cell::Money(totals.tax),
        Cell::Money(totals.net),
    ])?;

    sheet.finish()
}

/// Tax summary: per-employee tax rollup with effective-rate display, plus a
/// percentage-of-gross breakdown across the whole result set.
pub fn build_tax_report(
    rows: &[PayrollWithEmployee],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<u8>, XlsxError> {
    const COLUMNS: &[Column] = &[
        Column::wide("Employee ID", 12.0),
        Column::wide("Employee Name", 24.0),
        Column::new("Gross Salary"),
        Column::new("Tax Amount"),
        Column::new("Effective Tax Rate"),
        Column::new("Net Salary"),
    ];

    let mut sheet = SheetBuilder::new(ReportType::Tax.title(), COLUMNS.len() as u16)?;
    sheet.period_banner(start, end)?;
    sheet.headers(COLUMNS)?;

    let employees = totals_by_employee(rows);
    for employee in &employees {
        let rate_cell = match employee.effective_tax_rate() {
            Some(rate) => Cell::Percent(rate),
            None => Cell::Text("Varies".to_string()),
        };
        sheet.data_row(&[
            Cell::Int(employee.employee_id as i64),
            Cell::Text(employee.name.clone()),
            Cell::Money(employee.gross),
            Cell::Money(employee.tax),
            rate_cell,
            Cell::Money(employee.net),
        ])?;
    }

    let totals = grand_totals(rows);
    sheet.total_row(&[
        Cell::Empty,
        Cell::Text("Total".to_string()),
        Cell::Money(totals.gross),
        Cell::Money(totals.tax),
        Cell::Empty,
        Cell::Money(totals.net),
    ])?;

    // Share of gross going to tax, everything else withheld, and take-home.
    let other_deductions = totals.gross - totals.tax - totals.net;
    sheet.blank_row();
    sheet.section_title("Breakdown (% of Gross)")?;
    sheet.headers(&[
        Column::new("Tax"),
        Column::new("Other Deductions"),
        Column::new("Net"),
    ])?;
    sheet.data_row(&[
        Cell::Percent(percent_of(totals.tax, totals.gross)),
        Cell::Percent(percent_of(other_deductions, totals.gross)),
        Cell::Percent(percent_of(totals.net, totals.gross)),
    ])?;

    sheet.finish()
}

/// Single-payroll payslip: an employee banner followed by earnings and
/// deductions tables, ending in the bold net amount.
pub fn build_payslip(payroll: &PayrollWithEmployee) -> Result<Vec<u8>, XlsxError> {
    const COLUMNS: &[Column] = &[Column::wide("Description", 28.0), Column::new("Amount")];

    let mut sheet = SheetBuilder::new("Payslip", COLUMNS.len() as u16)?;

    sheet.section_title(&payroll.employee_name())?;
    sheet.data_row(&[
        Cell::Text("Reference".to_string()),
        Cell::Text(payroll.reference_id.clone()),
    ])?;
    sheet.data_row(&[
        Cell::Text("Department".to_string()),
        Cell::Text(department_label(&payroll.department).to_string()),
    ])?;
    sheet.data_row(&[
        Cell::Text("Pay Period".to_string()),
        Cell::Date(payroll.pay_period),
    ])?;
    sheet.data_row(&[
        Cell::Text("Payment Status".to_string()),
        Cell::Text(payroll.payment_status.to_string()),
    ])?;
    if let Some(paid_on) = payroll.payment_date {
        sheet.data_row(&[Cell::Text("Payment Date".to_string()), Cell::Date(paid_on)])?;
    }

    sheet.blank_row();
    sheet.section_title("Earnings")?;
    sheet.headers(COLUMNS)?;
    sheet.data_row(&[
        Cell::Text("Gross Salary".to_string()),
        Cell::Money(payroll.gross_salary),
    ])?;
    sheet.data_row(&[
        Cell::Text("Allowances".to_string()),
        Cell::Money(payroll.total_allowances),
    ])?;

    sheet.blank_row();
    sheet.section_title("Deductions")?;
    sheet.headers(COLUMNS)?;
    sheet.data_row(&[Cell::Text("Tax".to_string()), Cell::Money(payroll.tax_amount)])?;
    sheet.data_row(&[Cell::Text("Tax Rate".to_string()), Cell::Percent(payroll.tax_rate)])?;
    sheet.data_row(&[
        Cell::Text("Health Insurance".to_string()),
        Cell::Money(payroll.health_insurance),
    ])?;
    sheet.data_row(&[
        Cell::Text("Retirement".to_string()),
        Cell::Money(payroll.retirement_amount),
    ])?;
    sheet.data_row(&[
        Cell::Text("Other Deductions".to_string()),
        Cell::Money(payroll.total_deductions),
    ])?;

    sheet.blank_row();
    sheet.total_row(&[
        Cell::Text("Net Salary".to_string()),
        Cell::Money(payroll.net_salary),
    ])?;

    sheet.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payroll::PaymentStatus;
    use chrono::Datelike;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(
        employee_id: u64,
        name: (&str, &str),
        department: Option<Department>,
        period: NaiveDate,
        gross: Decimal,
        tax_rate: Decimal,
    ) -> PayrollWithEmployee {
        let tax = (gross * tax_rate / dec!(100)).round_dp(2);
        let retirement = (gross * dec!(5) / dec!(100)).round_dp(2);
        let net = gross - tax - dec!(2000) - retirement;
        PayrollWithEmployee {
            id: employee_id * 100 + period.month() as u64,
            employee_id,
            reference_id: format!("PAY-2026{:02}-{:04}-abc123", period.month(), employee_id),
            pay_period: period,
            gross_salary: gross,
            total_allowances: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            tax_rate,
            health_insurance: dec!(2000),
            retirement_rate: dec!(5),
            tax_amount: tax,
            retirement_amount: retirement,
            net_salary: net,
            payment_status: PaymentStatus::Pending,
            payment_date: None,
            first_name: name.0.to_string(),
            last_name: name.1.to_string(),
            department,
        }
    }

    fn sample_rows() -> Vec<PayrollWithEmployee> {
        vec![
            row(1, ("Ada", "Lovelace"), Some(Department::Engineering), d(2026, 1, 1), dec!(90000), dec!(16)),
            row(1, ("Ada", "Lovelace"), Some(Department::Engineering), d(2026, 2, 1), dec!(90000), dec!(16)),
            row(2, ("Grace", "Hopper"), Some(Department::Engineering), d(2026, 1, 1), dec!(80000), dec!(16)),
            row(3, ("Jean", "Bartik"), Some(Department::Finance), d(2026, 1, 1), dec!(70000), dec!(16)),
            row(4, ("Mary", "Keller"), None, d(2026, 1, 1), dec!(60000), dec!(18)),
        ]
    }

    #[test]
    fn employee_totals_sum_their_rows() {
        let rows = sample_rows();
        let totals = totals_by_employee(&rows);
        assert_eq!(totals.len(), 4);

        let ada = totals.iter().find(|e| e.employee_id == 1).unwrap();
        assert_eq!(ada.payroll_count, 2);
        assert_eq!(ada.gross, dec!(180000));
        assert_eq!(ada.effective_tax_rate(), Some(dec!(16)));
    }

    #[test]
    fn varying_tax_rate_reported_as_none() {
        let mut rows = sample_rows();
        rows.push(row(4, ("Mary", "Keller"), None, d(2026, 2, 1), dec!(60000), dec!(16)));
        let totals = totals_by_employee(&rows);
        let mary = totals.iter().find(|e| e.employee_id == 4).unwrap();
        assert_eq!(mary.effective_tax_rate(), None);
    }

    #[test]
    fn department_totals_equal_sum_of_employee_rows() {
        let rows = sample_rows();
        let departments = totals_by_department(&rows);

        let mut dept_gross_sum = Decimal::ZERO;
        let mut dept_net_sum = Decimal::ZERO;
        for dept in &departments {
            let employee_gross: Decimal = dept.employees.iter().map(|e| e.gross).sum();
            let employee_net: Decimal = dept.employees.iter().map(|e| e.net).sum();
            assert_eq!(dept.gross, employee_gross);
            assert_eq!(dept.net, employee_net);
            dept_gross_sum += dept.gross;
            dept_net_sum += dept.net;
        }

        let totals = grand_totals(&rows);
        assert_eq!(dept_gross_sum, totals.gross);
        assert_eq!(dept_net_sum, totals.net);
    }

    #[test]
    fn unassigned_department_groups_under_none() {
        let rows = sample_rows();
        let departments = totals_by_department(&rows);
        let unassigned = departments.iter().find(|d| d.department.is_none()).unwrap();
        assert_eq!(unassigned.employee_count(), 1);
        assert_eq!(department_label(&unassigned.department), "Unassigned");
    }

    #[test]
    fn percent_breakdown_covers_the_whole_gross() {
        let rows = sample_rows();
        let totals = grand_totals(&rows);
        let other = totals.gross - totals.tax - totals.net;

        let sum = percent_of(totals.tax, totals.gross)
            + percent_of(other, totals.gross)
            + percent_of(totals.net, totals.gross);
        // rounding each share to 2dp can shift the sum by a cent or two
        assert!((sum - dec!(100)).abs() <= dec!(0.02), "sum was {}", sum);
    }

    #[test]
    fn percent_of_zero_gross_is_zero() {
        assert_eq!(percent_of(dec!(10), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn payslip_emits_a_workbook() {
        let mut payroll = row(
            1,
            ("Ada", "Lovelace"),
            Some(Department::Engineering),
            d(2026, 3, 1),
            dec!(90000),
            dec!(16),
        );
        payroll.payment_status = PaymentStatus::Paid;
        payroll.payment_date = Some(d(2026, 3, 31));

        let bytes = build_payslip(&payroll).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn all_four_builders_emit_workbooks() {
        let rows = sample_rows();
        let start = d(2026, 1, 1);
        let end = d(2026, 2, 28);

        for bytes in [
            build_payroll_report(&rows, start, end).unwrap(),
            build_department_report(&rows, start, end, false).unwrap(),
            build_department_report(&rows, start, end, true).unwrap(),
            build_employee_report(&rows, start, end).unwrap(),
            build_tax_report(&rows, start, end).unwrap(),
        ] {
            assert_eq!(&bytes[..2], b"PK");
        }
    }
}
