use std::io::Write;
use std::process::{Command, Output, Stdio};

use reply_tally_hooks::annotation;

fn run_hook(bin: &str, input: &str) -> Output {
    let td = tempfile::tempdir().unwrap();
    let mut child = Command::new(bin)
        .current_dir(td.path())
        .env_remove("HOOKS_CONFIG_FILE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn hook");
    child.stdin.as_mut().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn e2e_inlet_annotates_body() {
    let body = serde_json::json!({
        "model": "qwen",
        "messages": [
            {"role": "system", "content": "你是助手。"},
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "你好，世界！Hello"}
        ]
    });

    let out = run_hook(env!("CARGO_BIN_EXE_inlet"), &body.to_string());
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["model"], "qwen");
    assert_eq!(
        v["messages"][0]["content"].as_str().unwrap(),
        format!("你是助手。\n{}", annotation(4))
    );
    assert_eq!(v["messages"].as_array().unwrap().len(), 3);
}

#[test]
fn e2e_inlet_inserts_system_message() {
    let body = r#"{"messages":[{"role":"user","content":"早安"}]}"#;
    let out = run_hook(env!("CARGO_BIN_EXE_inlet"), body);
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["messages"][0]["role"], "system");
    assert_eq!(v["messages"][0]["content"].as_str().unwrap(), annotation(0));
    assert_eq!(v["messages"][1]["content"], "早安");
}

#[test]
fn e2e_inlet_passes_through_non_json() {
    let raw = "not json at all";
    let out = run_hook(env!("CARGO_BIN_EXE_inlet"), raw);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), raw);
}

#[test]
fn e2e_outlet_is_identity() {
    let body = serde_json::json!({
        "messages": [{"role": "assistant", "content": "回覆內容"}],
        "done": true
    });
    let out = run_hook(env!("CARGO_BIN_EXE_outlet"), &body.to_string());
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v, body);
}

const UNSORTED_BIG_INT_BODY: &str = r#"{"stream":true,"id":123456789012345678901234567890,"messages":[{"role":"assistant","content":"好"}]}"#;

#[test]
fn e2e_outlet_keeps_key_order_and_big_integers() {
    let out = run_hook(env!("CARGO_BIN_EXE_outlet"), UNSORTED_BIG_INT_BODY);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim_end(), UNSORTED_BIG_INT_BODY);
}

#[test]
fn e2e_inlet_leaves_untouched_fields_byte_identical() {
    let out = run_hook(env!("CARGO_BIN_EXE_inlet"), UNSORTED_BIG_INT_BODY);
    assert!(out.status.success());
    let expected = format!(
        r#"{{"stream":true,"id":123456789012345678901234567890,"messages":[{{"role":"system","content":"{}"}},{{"role":"assistant","content":"好"}}]}}"#,
        annotation(1)
    );
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim_end(), expected);
}
