/// Grid Example
///
/// This example demonstrates:
/// - Binding a DataTable to a table element
/// - Sorting by header clicks
/// - Searching and paging
/// - Listening to draw notifications
/// - Adding and editing rows after construction
///
/// Run with `RUST_LOG=debug` to see the pipeline log.

use livegrid::{build_table, CellValue, DataTable, DisplayLength, Event, Options, PageAction};
use std::cell::RefCell;
use std::rc::Rc;

fn print_page(table: &DataTable) {
    for tr in table.rendered_rows() {
        let tr = tr.borrow();
        let cells: Vec<String> = tr
            .child_elements_by_tag(&["td", "th"])
            .iter()
            .map(|td| td.borrow().text_content())
            .collect();
        println!("      {}", cells.join(" | "));
    }
    println!("   {}\n", table.info_text());
}

fn main() {
    env_logger::init();

    println!("=== LiveGrid Example ===\n");

    // 1. Build a products table
    println!("1. Creating products table...");
    let items = [
        ("Laptop", "Electronics", "999.99"),
        ("Mouse", "Electronics", "29.99"),
        ("Desk", "Furniture", "299.99"),
        ("Chair", "Furniture", "199.99"),
        ("Monitor", "Electronics", "399.99"),
        ("Lamp", "Furniture", "49.99"),
        ("Keyboard", "Electronics", "79.99"),
    ];
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|(product, category, price)| {
            vec![product.to_string(), category.to_string(), price.to_string()]
        })
        .collect();
    let element = build_table(&["Product", "Category", "Price"], &rows);

    let options = Options::from_json(r#"{"pageLength": 3}"#).expect("valid options");
    let mut table = DataTable::new(&element, options).expect("table element");

    let draws = Rc::new(RefCell::new(0));
    let counter = draws.clone();
    table.on(Event::Draw, move |_, _| *counter.borrow_mut() += 1);

    print_page(&table);

    // 2. Sort by price, highest first
    println!("2. Sorting by price (two header clicks)...");
    table.header_click(2).unwrap();
    table.header_click(2).unwrap();
    print_page(&table);

    // 3. Page through the results
    println!("3. Next page...");
    table.page(PageAction::Next).unwrap();
    print_page(&table);

    // 4. Search
    println!("4. Searching for \"Furniture\"...");
    table.search("Furniture").unwrap();
    print_page(&table);

    // 5. Add a row and edit one
    println!("5. Adding a bookshelf and repricing the desk...");
    table
        .add_row(vec![
            CellValue::from("Bookshelf"),
            CellValue::from("Furniture"),
            CellValue::from("149.99"),
        ])
        .unwrap();
    table.set_cell(2, 2, CellValue::from("259.99")).unwrap();
    table.redraw(true).unwrap();
    print_page(&table);

    // 6. Show everything
    println!("6. Clearing the search and showing all rows...");
    table.search("").unwrap();
    table.page_length(DisplayLength::All).unwrap();
    print_page(&table);

    // 7. Column sizing
    table.adjust_column_sizing().unwrap();
    for column in table.settings().columns().iter() {
        println!(
            "   {:<10} width {}",
            column.title(),
            column.width().unwrap_or("-")
        );
    }

    println!("\n   {} draws in total", draws.borrow());
    println!("\n=== Example Complete ===");
}
