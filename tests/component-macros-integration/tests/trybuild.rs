//! 注册宏的编译测试

#[test]
fn trybuild_registration_macros() {
    let t = trybuild::TestCases::new();
    t.pass("tests/trybuild/component_ok.rs");
    t.pass("tests/trybuild/data_ok.rs");
}
