use std::io::{self, Write};

use anyhow::Error;
use opioid_db::{NotFound, RegistryError};

pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr, "error: {err}");
    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "  caused by: {cause}");
    }
    if let Some(hint) = hint_for(err) {
        let _ = writeln!(stderr, "  hint: {hint}");
    }
}

fn hint_for(err: &Error) -> Option<&'static str> {
    if err.downcast_ref::<NotFound>().is_some() {
        return Some("names are case-sensitive; run `opioid-db list` to see them");
    }
    if err.downcast_ref::<RegistryError>().is_some() {
        return Some("the --data file must be a JSON array of complete compound records");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn hints_survive_context() {
        let err = Err::<(), _>(NotFound("heroin".to_owned()))
            .context("lookup failed")
            .unwrap_err();
        assert!(hint_for(&err).is_some());
        assert!(hint_for(&anyhow::anyhow!("something else")).is_none());
    }
}
