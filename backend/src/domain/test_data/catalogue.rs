//! Fixed reference accounts, questions and answers written by the seeder.

use crate::domain::Role;

/// Reference account. Passwords are hashed before they are stored.
#[derive(Debug, Clone, Copy)]
pub struct SeedAccount {
    pub login_id: &'static str,
    pub password: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub role: Role,
}

pub const SEED_ACCOUNTS: [SeedAccount; 6] = [
    SeedAccount {
        login_id: "admin",
        password: "admin123!",
        name: "시스템 관리자",
        email: "admin@example.com",
        phone: "010-0000-0000",
        role: Role::Admin,
    },
    SeedAccount {
        login_id: "testuser1",
        password: "user123!",
        name: "테스트 사용자1",
        email: "test1@example.com",
        phone: "010-1111-1111",
        role: Role::User,
    },
    SeedAccount {
        login_id: "testuser2",
        password: "user123!",
        name: "테스트 사용자2",
        email: "test2@example.com",
        phone: "010-2222-2222",
        role: Role::User,
    },
    SeedAccount {
        login_id: "testuser3",
        password: "user123!",
        name: "테스트 사용자3",
        email: "test3@example.com",
        phone: "010-3333-3333",
        role: Role::User,
    },
    SeedAccount {
        login_id: "developer",
        password: "dev123!",
        name: "개발자",
        email: "dev@example.com",
        phone: "010-4444-4444",
        role: Role::User,
    },
    SeedAccount {
        login_id: "tester",
        password: "test123!",
        name: "테스터",
        email: "tester@example.com",
        phone: "010-5555-5555",
        role: Role::User,
    },
];

/// Login ids the validator expects to find.
pub const EXPECTED_LOGIN_IDS: [&str; 6] =
    ["admin", "testuser1", "testuser2", "testuser3", "developer", "tester"];

/// Authors are assigned round-robin, so seeding needs at least this many users.
pub const REQUIRED_AUTHORS: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct SeedAnswerText {
    pub content: &'static str,
    pub votes: i32,
    pub accepted: bool,
    /// Index into the author list.
    pub author: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct SeedQuestionText {
    pub title: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub views: i32,
    pub answers: &'static [SeedAnswerText],
}

pub const SEED_QUESTIONS: [SeedQuestionText; 3] = [
    SeedQuestionText {
        title: "Why did Vue choose a reactivity-based state management approach, and why does Vue 3 support both 'ref()' and 'reactive()'?",
        description: "I'm curious about the background and philosophy behind Vue's decision to adopt a reactivity-based state management approach. I understand the various benefits of using a reactive state...",
        tags: &["vue.js", "vuejs2", "vuejs3", "reactive"],
        views: 2,
        answers: &[],
    },
    SeedQuestionText {
        title: "How to find the start of a substring that isn't proceeded by a certain character, and ends with a character not proceeded by a character, in regex",
        description: "So, I have a regex problem I'm trying to solve and can't figure out. I need to find a string that starts with R or K, but not followed by a #, continuing onwards til it finds another R or K which...",
        tags: &["regex", "string"],
        views: 5,
        answers: &[],
    },
    SeedQuestionText {
        title: "SignalR in dotnet 9 and Angular v19 errors - Websockets issues",
        description: "here is errors from Chrome Debugger's screen: [2025-03-14T07:24:52.776Z] Information: Normalizing '/downloadHub' to 'https://127.0.0.1:63349/downloadHub'. Utils.js:148 [2025-03-14T07:24:52.776Z]...",
        tags: &[".net", "angular", "asp.net-core-signalr"],
        views: 5,
        answers: &[
            SeedAnswerText {
                content: "To resolve this SignalR issue, try the following steps:\n\n1. **Check CORS settings**: Verify that CORS is properly configured in ASP.NET Core.\n2. **Verify port and URL**: Make sure the server is actually running at https://127.0.0.1:63349/downloadHub.\n3. **WebSocket transport**: Ensure WebSocket is explicitly enabled in SignalR configuration.\n4. **Browser dev tools**: Check WebSocket connection status in the Network tab.\n\nAdditional debugging tip: Check the browser console for detailed error messages.",
                votes: 2,
                accepted: true,
                author: 0,
            },
            SeedAnswerText {
                content: "This is a common issue when using Angular v19 with SignalR. Try this solution:\n\n```typescript\n// Add these options when setting up hub connection\nconst connection = new HubConnectionBuilder()\n  .withUrl('/downloadHub', {\n    skipNegotiation: true,\n    transport: HttpTransportType.WebSockets\n  })\n  .build();\n```\n\nAlso verify these server settings:\n- Configure SignalR before UseHttpsRedirection()\n- Include SignalR Hub in CORS policy\n- Check firewall settings for WebSocket connections",
                votes: 1,
                accepted: false,
                author: 1,
            },
        ],
    },
];
