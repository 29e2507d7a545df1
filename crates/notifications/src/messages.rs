//! Notification message bodies.

use crate::sink::Notification;

pub fn job_posted(to: &str, job_title: &str, company_name: &str, location: &str) -> Notification {
    Notification {
        to: to.to_string(),
        subject: format!("New Job Posted: {job_title}"),
        body: format!(
            "Dear Job Seeker,\n\n\
             A new job matching your interests has been posted!\n\n\
             Position: {job_title}\n\
             Company: {company_name}\n\
             Location: {location}\n\n\
             Visit our job board to view details and apply.\n\n\
             Best regards,\n\
             Job Board Team\n"
        ),
    }
}

pub fn application_submitted(to: &str, job_title: &str, company_name: &str) -> Notification {
    Notification {
        to: to.to_string(),
        subject: "Application Submitted Successfully".to_string(),
        body: format!(
            "Dear Applicant,\n\n\
             Your application has been successfully submitted!\n\n\
             Position: {job_title}\n\
             Company: {company_name}\n\n\
             We will review your application and get back to you soon.\n\
             You can track your application status in your dashboard.\n\n\
             Good luck!\n\n\
             Best regards,\n\
             Job Board Team\n"
        ),
    }
}

pub fn application_received(to: &str, job_title: &str, applicant_name: &str) -> Notification {
    Notification {
        to: to.to_string(),
        subject: format!("New Application Received for {job_title}"),
        body: format!(
            "Dear Employer,\n\n\
             You have received a new application!\n\n\
             Position: {job_title}\n\
             Applicant: {applicant_name}\n\n\
             Log in to your dashboard to review the application details.\n\n\
             Best regards,\n\
             Job Board Team\n"
        ),
    }
}

pub fn status_changed(
    to: &str,
    job_title: &str,
    company_name: &str,
    old_status: &str,
    new_status: &str,
) -> Notification {
    Notification {
        to: to.to_string(),
        subject: format!("Application Status Update: {job_title}"),
        body: format!(
            "Dear Applicant,\n\n\
             Your application status has been updated!\n\n\
             Position: {job_title}\n\
             Company: {company_name}\n\
             Previous Status: {old_status}\n\
             New Status: {new_status}\n\n\
             {}\n\n\
             Best regards,\n\
             Job Board Team\n",
            status_closing_line(new_status)
        ),
    }
}

fn status_closing_line(status: &str) -> &'static str {
    match status.to_uppercase().as_str() {
        "SHORTLISTED" => {
            "Congratulations! Your profile has been shortlisted. We will contact you soon."
        }
        "INTERVIEWED" => {
            "Thank you for attending the interview. We will get back to you with the results."
        }
        "ACCEPTED" => "Congratulations! Your application has been accepted. Welcome to the team!",
        "REJECTED" => {
            "Unfortunately, we have decided to proceed with other candidates. \
             We wish you the best in your job search."
        }
        "REVIEWED" => "Your application has been reviewed by our team.",
        _ => "Your application status has been updated.",
    }
}
