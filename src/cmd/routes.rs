use crate::router::{RouteTable, NOT_FOUND};


/// Prints all routes with their path patterns.
pub(crate) fn run() {
    let table = RouteTable::standard();

    bunt::println!("{$bold}{}{/$}", format!("{:<12} {}", "NAME", "PATTERN"));
    for route in table.routes() {
        println!("{:<12} {}", route.name(), route.pattern());
    }
    bunt::println!("{$dimmed}{}{/$}", format!("{:<12} (any other path)", NOT_FOUND));
}
