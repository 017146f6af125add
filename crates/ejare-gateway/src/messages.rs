//! Localized (Persian) client-facing strings. Internal error detail is
//! logged server-side and never reaches these messages.

pub const UNAUTHORIZED: &str = "دسترسی غیرمجاز";
pub const FORBIDDEN: &str = "شما اجازه دسترسی به این بخش را ندارید";
pub const LOGIN_FAILED: &str = "نام کاربری یا رمز عبور اشتباه است";
pub const CONTRACT_NOT_FOUND: &str = "قرارداد یافت نشد";
pub const CONTRACT_SIGNED: &str = "قرارداد با موفقیت امضا شد";
pub const CONTRACT_TERMINATED: &str = "قرارداد فسخ شد";
pub const SETTINGS_SAVED: &str = "تنظیمات اعلان‌ها ذخیره شد";
pub const TEST_SENT: &str = "پیام آزمایشی با موفقیت ارسال شد";
pub const TEST_FAILED: &str = "ارسال پیام آزمایشی ناموفق بود";
pub const UNKNOWN_CHANNEL: &str = "کانال اعلان نامعتبر است";
pub const MISSING_RECIPIENT: &str = "گیرنده‌ای برای ارسال مشخص نشده است";
pub const SERVER_ERROR: &str = "خطای داخلی سرور";

pub const ACCESS_CODE_SUBJECT: &str = "کد دسترسی قرارداد اجاره";
pub const SIGNED_SUBJECT: &str = "قرارداد اجاره امضا شد";
pub const TEST_SUBJECT: &str = "پیام آزمایشی";
pub const TEST_BODY: &str = "این یک پیام آزمایشی از سامانه مدیریت قراردادهای اجاره است";

/// Persian names for the Gregorian calendar months, indexed by month - 1.
pub const MONTH_NAMES: [&str; 12] = [
    "ژانویه",
    "فوریه",
    "مارس",
    "آوریل",
    "مه",
    "ژوئن",
    "ژوئیه",
    "اوت",
    "سپتامبر",
    "اکتبر",
    "نوامبر",
    "دسامبر",
];

/// Display label for a contract status code. Unknown codes pass through.
pub fn status_label(code: &str) -> &str {
    match code {
        "draft" => "پیش‌نویس",
        "active" => "فعال",
        "signed" => "امضا شده",
        "terminated" => "فسخ شده",
        other => other,
    }
}

/// Render a `YYYY-MM` month key as "<month name> <year>".
pub fn month_label(key: &str) -> String {
    if let Some((year, month)) = key.split_once('-') {
        if let Some(idx) = month.parse::<usize>().ok().filter(|m| (1..=12).contains(m)) {
            return format!("{} {}", MONTH_NAMES[idx - 1], year);
        }
    }
    key.to_string()
}
