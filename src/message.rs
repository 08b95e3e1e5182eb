use colored::Colorize;

use crate::api::{Course, Section};

pub struct Message;

// All prefixes padded inside brackets to match "[ERROR]" (5 chars inside)

impl Message {
    pub fn greet(user_id: i64) {
        let msg = format!(
            "hello #{}, welcome to {}!",
            user_id.to_string().bold(),
            "stepik".yellow()
        );
        println!("{} {}", "[STEP ]".blue(), msg);
    }

    pub fn say(msg: &str) {
        println!("{} {}", "[STEP ]".blue(), msg);
    }

    pub fn cheer(msg: &str) {
        println!("{} {}", "[OK   ]".green(), msg);
    }

    pub fn complain(msg: &str) {
        eprintln!("{} {}", "[WARN ]".yellow(), msg);
    }

    pub fn oops(msg: &str) {
        eprintln!("{} {}", "[ERROR]".red(), msg);
    }

    pub fn print_course(course: &Course) {
        println!("  {} {}", "[#]".dimmed(), course.title.bold());
        println!(
            "    {} {}  {} {}",
            "id:".dimmed(),
            course.id.to_string().dimmed(),
            "slug:".dimmed(),
            course.slug.dimmed()
        );

        if !course.sections.is_empty() {
            let sections: Vec<String> = course.sections.iter().map(i64::to_string).collect();
            println!("    {} {}", "sections:".dimmed(), sections.join(", "));
        }

        println!("    {} {}\n", "url:".dimmed(), course.url().dimmed());
    }

    pub fn print_courses(courses: &[Course]) {
        Self::say(&format!("courses ({} total):\n", courses.len()));
        for course in courses {
            Self::print_course(course);
        }
    }

    pub fn print_section(section: &Section) {
        println!(
            "  {} {}. {}",
            "[#]".dimmed(),
            section.position,
            section.title.bold()
        );

        if !section.description.is_empty() {
            println!("    {}", section.description);
        }

        println!(
            "    {} {}  {} {}  {} {}\n",
            "id:".dimmed(),
            section.id.to_string().dimmed(),
            "slug:".dimmed(),
            section.slug.dimmed(),
            "units:".dimmed(),
            section.units.len().to_string().dimmed()
        );
    }

    pub fn print_sections(sections: &[Section]) {
        Self::say(&format!("sections ({} total):\n", sections.len()));
        for section in sections {
            Self::print_section(section);
        }
    }
}

/// Welcome/greet the user
#[macro_export]
macro_rules! greet {
    ($user_id:expr) => {
        $crate::message::Message::greet($user_id)
    };
}

/// General info message
#[macro_export]
macro_rules! say {
    ($msg:expr) => {
        $crate::message::Message::say($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::message::Message::say(&format!($fmt, $($arg)*))
    };
}

/// Success message
#[macro_export]
macro_rules! cheer {
    ($msg:expr) => {
        $crate::message::Message::cheer($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::message::Message::cheer(&format!($fmt, $($arg)*))
    };
}

/// Warning message
#[macro_export]
macro_rules! complain {
    ($msg:expr) => {
        $crate::message::Message::complain($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::message::Message::complain(&format!($fmt, $($arg)*))
    };
}

/// Error message
#[macro_export]
macro_rules! oops {
    ($msg:expr) => {
        $crate::message::Message::oops($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::message::Message::oops(&format!($fmt, $($arg)*))
    };
}
