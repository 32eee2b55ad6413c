// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use {
    std::path::Path,
    trycmd::{schema::TryCmd, Error},
};

fn load_trycmd(path: &Path) -> Result<TryCmd, Error> {
    let mut cmd = TryCmd::load_trycmd(path)?;

    // Commands run from a sandboxed copy of the crate root so fixtures under
    // src/testdata resolve.
    let cwd = std::env::current_dir().map_err(Error::new)?;

    cmd.fs.base = Some(cwd.clone());
    cmd.fs.cwd = Some(cwd);
    cmd.fs.sandbox = Some(true);

    Ok(cmd)
}

#[test]
fn cli_tests() {
    let cases = trycmd::TestCases::new();

    cases.file_extension_loader("trycmd", load_trycmd);

    cases.case("tests/cmd/*.trycmd");
}
