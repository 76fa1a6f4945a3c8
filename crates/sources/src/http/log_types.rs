//! Auth0 log event type codes
//!
//! Log stream entries carry a short `data.type` code. The receiver adds the
//! long-form description as `data.type_description` before queueing.

use serde_json::Value;

/// Description used for codes missing from the table
pub const UNKNOWN_EVENT_TYPE: &str = "Unknown event type";

/// Look up the description of an event type code
pub fn describe(code: &str) -> Option<&'static str> {
    let description = match code {
        "acls_summary" => "Denied Login Attempts Summary",
        "admin_update_launch" => "Auth0 Update Launched",
        "api_limit" => "Rate Limit on the Authentication or Management APIs",
        "api_limit_warning" => "Rate Limit Warning on the Authentication or Management APIs",
        "appi" => "App Installed",
        "cls" => "Code/Link Sent",
        "coff" => "AD/LDAP Connector Offline",
        "con" => "AD/LDAP Connector Online",
        "cs" => "Code Sent",
        "depnote" => "Deprecation Notice",
        "du" => "Deleted User",
        "f" => "Failed Login",
        "fapi" => "Failed API Operation",
        "fc" => "Failed by Connector",
        "fce" => "Failed Change Email",
        "fco" => "Failed by CORS",
        "fcoa" => "Failed cross-origin authentication",
        "fcp" => "Failed Change Password",
        "fcph" => "Failed Post Change Password Hook",
        "fcpn" => "Failed Change Phone Number",
        "fcpr" => "Failed Change Password Request",
        "fcpro" => "Failed Connector Provisioning",
        "fcu" => "Failed Change Username",
        "fd" => "Failed Delegation",
        "fdeac" => "Failed Device Activation",
        "fdeaz" => "Failed Device Authorization Request",
        "fdecc" => "User Canceled Device Confirmation",
        "fdu" => "Failed User Deletion",
        "feacft" => "Failed Exchange Authorization Code for Access Token",
        "feccft" => "Failed Exchange Access Token for a Client Credentials Grant",
        "fede" => "Failed Exchange Device Code for Access Token",
        "fens" => "Failed Exchange Native Social Login",
        "feoobft" => "Failed Exchange Password and OOB Challenge for Access Token",
        "feotpft" => "Failed Exchange Password and OTP Challenge for Access Token",
        "fepft" => "Failed Exchange Password for Access Token",
        "fepotpft" => "Failed Exchange Passwordless OTP for Access Token",
        "fercft" => "Failed Exchange Password and MFA Recovery code for Access Token",
        "fertft" => "Failed Exchange Refresh Token for Access Token",
        "ff" => "Failed Federated Logout",
        "fi" => "Failed invite accept",
        "flo" => "Failed Logout",
        "fn" => "Failed Sending Notification",
        "fp" => "Failed Login (Incorrect Password)",
        "fs" => "Failed Signup",
        "fsa" => "Failed Silent Auth",
        "fu" => "Failed Login (Invalid Email/Username)",
        "fui" => "Failed users import",
        "fv" => "Failed Verification Email",
        "fvr" => "Failed Verification Email Request",
        "gd_auth_failed" => "OTP Auth failed",
        "gd_auth_rejected" => "OTP Auth rejected",
        "gd_auth_succeed" => "OTP Auth success",
        "gd_enrollment_complete" => "Guardian enrollment complete",
        "gd_otp_rate_limit_exceed" => "Too many failures",
        "gd_recovery_failed" => "Recovery failed",
        "gd_recovery_rate_limit_exceed" => "Too many failures",
        "gd_recovery_succeed" => "Recovery success",
        "gd_send_pn" => "Push notification sent",
        "gd_send_sms" => "SMS sent",
        "gd_send_sms_failure" => "SMS sent failures",
        "gd_start_auth" => "Second factor started",
        "gd_start_enroll" => "Enroll started",
        "gd_tenant_update" => "Guardian tenant update",
        "gd_unenroll" => "Unenroll device account",
        "gd_update_device_account" => "Update device account",
        "limit_delegation" => "Too Many Calls to /delegation",
        "limit_mu" => "Blocked IP Address",
        "limit_sul" => "Blocked Account",
        "limit_wc" => "Blocked Account",
        "mfar" => "MFA Required",
        "mgmt_api_read" => "Management API read Operation",
        "pla" => "Pre-login assessment",
        "pwd_leak" => "Breached password",
        "s" => "Success Login",
        "sapi" => "Success API Operation",
        "sce" => "Success Change Email",
        "scoa" => "Success cross-origin authentication",
        "scp" => "Success Change Password",
        "scph" => "Success Post Change Password Hook",
        "scpn" => "Success Change Phone Number",
        "scpr" => "Success Change Password Request",
        "scu" => "Success Change Username",
        "sd" => "Success Delegation",
        "sdu" => "Success User Deletion",
        "seacft" => "Success Exchange Authorization Code for Access Token",
        "seccft" => "Success Exchange Access Token for a Client Credentials Grant",
        "sede" => "Success Exchange Device Code for Access Token",
        "sens" => "Success Exchange Native Social Login",
        "seoobft" => "Success Exchange Password and OOB Challenge for Access Token",
        "seotpft" => "Success Exchange Password and OTP Challenge for Access Token",
        "sepft" => "Success Exchange Password for Access Token",
        "sercft" => "Success Exchange Password and MFA Recovery code for Access Token",
        "sertft" => "Success Exchange Refresh Token for Access Token",
        "si" => "Successfully accepted a user invite",
        "srrt" => "Success Revocation",
        "slo" => "Success Logout",
        "ss" => "Success Signup",
        "ssa" => "Success Silent Auth",
        "sui" => "Success users import",
        "sv" => "Success Verification Email",
        "svr" => "Success Verification Email Request",
        "sys_os_update_end" => "Auth0 OS Update Ended",
        "sys_os_update_start" => "Auth0 OS Update Started",
        "sys_update_end" => "Auth0 Update Ended",
        "sys_update_start" => "Auth0 Update Started",
        "ublkdu" => "User login block released",
        "w" => "Warnings During Login",
        _ => return None,
    };
    Some(description)
}

/// Set `data.type_description` on a log entry
///
/// Entries without a `data` object are left untouched.
pub fn enrich(entry: &mut Value) {
    let Some(data) = entry.get_mut("data").and_then(Value::as_object_mut) else {
        return;
    };

    let description = data
        .get("type")
        .and_then(Value::as_str)
        .and_then(describe)
        .unwrap_or(UNKNOWN_EVENT_TYPE);

    data.insert("type_description".into(), Value::from(description));
}
