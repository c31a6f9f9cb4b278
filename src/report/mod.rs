pub mod table;
pub mod json;

use crate::history::Snapshot;

pub fn print(entries: &[(usize, &Snapshot)], json_output: bool) {
    if json_output {
        println!("{}", json::render(entries));
    } else {
        print!("{}", table::render(entries));
    }
}
