/// Preset process descriptions offered next to the input box.
pub const EXAMPLE_DESCRIPTIONS: [(&str, &str); 2] = [
    (
        "Train Path Allocation",
        "First, the system receives a request for a new train path. Then, it checks for any \
         conflicting requests in the timetable. If there are no conflicts, the path is allocated. \
         If there are conflicts, a coordination process is initiated.",
    ),
    (
        "Safety Certificate Verification",
        "The system receives a safety certificate application. It validates the documentation. \
         If valid, it checks compliance with regulations. If compliant, the certificate is \
         issued. If not compliant, feedback is provided and the application is returned for \
         revision.",
    ),
];
