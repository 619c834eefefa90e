use std::fs;

use chrono::NaiveDate;
use invoice_render::{
    DateValue, Frequency, Invoice, InvoiceArchive, InvoiceRenderer, LineItem, OutputFormat, Rasterizer,
    RecurringInvoice, RecurringSchedule, RenderError, RenderRequest,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn retainer() -> RecurringInvoice {
    RecurringInvoice {
        schedule: RecurringSchedule::new(Frequency::Monthly, date(2025, 9, 1)),
        request: RenderRequest {
            invoice: Invoice {
                line_items: vec![LineItem::new("Retainer {{MONTH_NAME}}", 1.0, 1500.0)],
                currency: "EUR".into(),
                ..Default::default()
            },
            ..Default::default()
        },
    }
}

struct FixedPdf;

impl Rasterizer for FixedPdf {
    fn rasterize(&self, html: &str, format: OutputFormat) -> invoice_render::Result<Vec<u8>> {
        assert_eq!(format, OutputFormat::Pdf);
        assert!(html.contains("Retainer August"));
        Ok(b"%PDF-1.7".to_vec())
    }
}

#[test]
fn two_runs_on_one_day_get_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let archive = InvoiceArchive::new(dir.path());
    let renderer = InvoiceRenderer::with_builtin_templates().unwrap();
    let mut recurring = retainer();
    let run_date = date(2025, 9, 1);

    let first = archive.issue(&renderer, &mut recurring, "INV_", run_date, None).unwrap();
    assert_eq!(first.number, "INV20250901-01");
    assert_eq!(first.path, dir.path().join("2025").join("inv20250901-01.html"));
    assert_eq!(first.next_run, Some(date(2025, 10, 1)));
    let first_html = fs::read_to_string(&first.path).unwrap();
    assert!(first_html.contains("INV20250901-01"));
    assert!(first_html.contains("Retainer August"));

    let second = archive.issue(&renderer, &mut recurring, "INV_", run_date, None).unwrap();
    assert_eq!(second.number, "INV20250901-02");
    assert_ne!(second.path, first.path);
    assert_eq!(second.next_run, Some(date(2025, 11, 1)));

    assert_eq!(fs::read_to_string(&first.path).unwrap(), first_html);
    assert!(fs::read_to_string(&second.path).unwrap().contains("INV20250901-02"));
    assert_eq!(recurring.schedule.next_generation_date, Some(date(2025, 11, 1)));
}

#[test]
fn numbering_continues_across_output_formats() {
    let dir = tempfile::tempdir().unwrap();
    let archive = InvoiceArchive::new(dir.path());
    let renderer = InvoiceRenderer::with_builtin_templates().unwrap();
    let mut recurring = retainer();

    let html = archive.issue(&renderer, &mut recurring, "inv", date(2025, 9, 1), None).unwrap();
    let pdf = archive
        .issue(&renderer, &mut recurring, "INV", date(2025, 9, 1), Some(&FixedPdf))
        .unwrap();

    assert_eq!(html.number, "INV20250901-01");
    assert_eq!(pdf.number, "INV20250901-02");
    assert_eq!(pdf.path.extension().and_then(|e| e.to_str()), Some("pdf"));
    assert_eq!(fs::read(&pdf.path).unwrap(), b"%PDF-1.7");
}

#[test]
fn existing_file_is_never_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let archive = InvoiceArchive::new(dir.path());
    let path = archive.path_for("INV20250901-01", date(2025, 9, 1), "html");

    archive.write_new(&path, b"original").unwrap();
    let err = archive.write_new(&path, b"replacement").unwrap_err();

    assert!(matches!(err, RenderError::OutputExists(ref p) if *p == path));
    assert_eq!(fs::read(&path).unwrap(), b"original");
}

#[test]
fn failed_issue_leaves_schedule_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let archive = InvoiceArchive::new(dir.path());
    let renderer = InvoiceRenderer::with_builtin_templates().unwrap();
    let mut recurring = retainer();

    // A directory squatting on the next file name makes the write fail
    fs::create_dir_all(dir.path().join("2025").join("inv20250901-01.html").join("x")).unwrap();
    assert!(archive.issue(&renderer, &mut recurring, "INV", date(2025, 9, 1), None).is_err());
    assert_eq!(recurring.schedule.next_date(), date(2025, 9, 1));
    assert!(recurring.schedule.is_active);
}

#[test]
fn rendered_request_files_under_its_invoice_year() {
    let archive = InvoiceArchive::new("/srv/invoices");
    let invoice = Invoice {
        invoice_number: "INV-2024-042".into(),
        date: Some(DateValue::from(date(2024, 12, 30))),
        ..Default::default()
    };

    let filed = invoice.issue_date().unwrap();
    assert_eq!(
        archive.path_for(&invoice.invoice_number, filed, "html"),
        archive.root().join("2024").join("inv-2024-042.html")
    );
}
